use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of one upload record. Generated, never derived from the filename,
/// so two files with the same name can live in the queue at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(u64);

impl RecordId {
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        RecordId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// The raw bytes to send, either still on disk or already in memory
/// (drag-and-drop can deliver either).
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// Snapshot of a record handed to the upload worker.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub id: RecordId,
    pub name: String,
    pub payload: Payload,
    pub size_bytes: u64,
}

/// Messages the worker sends back to the UI thread.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    Progress { id: RecordId, percent: f32 },
    Succeeded { id: RecordId, link: String },
    Failed { id: RecordId },
}
