use crate::upload::{Payload, RecordId, UploadJob};
use eframe::egui;
use std::path::PathBuf;

/// Bucket used when a filename carries no extension.
pub const UNKNOWN_EXTENSION: &str = "unknown";

/// One file's upload tracking entry.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRecord {
    pub id: RecordId,
    pub name: String,
    pub payload: Payload,
    pub size_bytes: u64,
    pub progress: f32,
    pub download_link: String,
    pub failed: bool,
}

impl UploadRecord {
    fn new(file: IncomingFile) -> Self {
        Self {
            id: RecordId::next(),
            name: file.name,
            payload: file.payload,
            size_bytes: file.size_bytes,
            progress: 0.0,
            download_link: String::new(),
            failed: false,
        }
    }

    /// Still wants an upload: not failed and no link yet.
    pub fn is_pending(&self) -> bool {
        !self.failed && self.download_link.is_empty()
    }
}

/// Records sharing one file extension, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionGroup {
    pub extension: String,
    pub records: Vec<UploadRecord>,
}

/// Update applied to exactly one record during reconciliation.
#[derive(Debug, Clone)]
pub enum RecordUpdate {
    Progress(f32),
    Succeeded(String),
    Failed,
}

/// The shared queue: extension groups in first-seen order, at most one group
/// per extension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueState {
    pub groups: Vec<ExtensionGroup>,
}

impl QueueState {
    /// Classifier: append `files` to this state, grouping by extension.
    pub fn classify(&mut self, files: Vec<IncomingFile>) {
        for file in files {
            let extension = extension_of(&file.name);
            let record = UploadRecord::new(file);
            match self.group_mut(&extension) {
                Some(group) => group.records.push(record),
                None => self.groups.push(ExtensionGroup {
                    extension,
                    records: vec![record],
                }),
            }
        }
    }

    /// Confirmation step of the staged flow: drain `staged` into this state,
    /// appending into existing groups and inserting new ones at the end.
    pub fn merge(&mut self, staged: &mut QueueState) {
        for group in staged.groups.drain(..) {
            match self.group_mut(&group.extension) {
                Some(existing) => existing.records.extend(group.records),
                None => self.groups.push(group),
            }
        }
    }

    fn group_mut(&mut self, extension: &str) -> Option<&mut ExtensionGroup> {
        self.groups.iter_mut().find(|g| g.extension == extension)
    }

    pub fn records(&self) -> impl Iterator<Item = &UploadRecord> {
        self.groups.iter().flat_map(|g| g.records.iter())
    }

    /// Selection rule: first record, scanning groups then records in order,
    /// that is neither failed nor completed.
    pub fn next_uploadable(&self) -> Option<UploadJob> {
        self.records().find(|r| r.is_pending()).map(|r| UploadJob {
            id: r.id,
            name: r.name.clone(),
            payload: r.payload.clone(),
            size_bytes: r.size_bytes,
        })
    }

    pub fn pending_count(&self) -> usize {
        self.records().filter(|r| r.is_pending()).count()
    }

    pub fn total_records(&self) -> usize {
        self.records().count()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Reconciliation: rebuild the whole state, swapping in the merged copy of
    /// the record with `id` and leaving every other entry untouched.
    pub fn reconcile(&self, id: RecordId, update: RecordUpdate) -> QueueState {
        let groups = self
            .groups
            .iter()
            .map(|group| ExtensionGroup {
                extension: group.extension.clone(),
                records: group
                    .records
                    .iter()
                    .map(|record| {
                        if record.id == id {
                            apply_update(record, &update)
                        } else {
                            record.clone()
                        }
                    })
                    .collect(),
            })
            .collect();
        QueueState { groups }
    }
}

fn apply_update(record: &UploadRecord, update: &RecordUpdate) -> UploadRecord {
    let mut updated = record.clone();
    match update {
        RecordUpdate::Progress(percent) => {
            // A late tick against a settled record is dropped, and simulated
            // progress can only move toward the ceiling.
            if updated.is_pending() {
                updated.progress = percent.clamp(0.0, 99.0).max(updated.progress);
            }
        }
        RecordUpdate::Succeeded(link) => {
            updated.progress = 100.0;
            updated.download_link = link.clone();
        }
        RecordUpdate::Failed => {
            updated.failed = true;
            updated.progress = 0.0;
        }
    }
    updated
}

/// Suffix after the last `.`, lowercased; the unknown bucket when there is no
/// dot or nothing follows it.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => UNKNOWN_EXTENSION.to_string(),
    }
}

/// A file as it arrives from the drop zone or the file dialog.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub payload: Payload,
    pub size_bytes: u64,
}

impl IncomingFile {
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let size_bytes = match std::fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                log::warn!("could not stat {}: {}", path.display(), e);
                return None;
            }
        };
        Some(Self {
            name,
            payload: Payload::Path(path),
            size_bytes,
        })
    }

    pub fn from_dropped(file: &egui::DroppedFile) -> Option<Self> {
        if let Some(path) = &file.path {
            Self::from_path(path.clone())
        } else if let Some(bytes) = &file.bytes {
            Some(Self {
                name: file.name.clone(),
                size_bytes: bytes.len() as u64,
                payload: Payload::Bytes(bytes.clone()),
            })
        } else {
            None
        }
    }
}
