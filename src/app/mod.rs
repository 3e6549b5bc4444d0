mod state;
mod ui;

pub use state::{ExtensionGroup, IncomingFile, QueueState, RecordUpdate, UploadRecord};

use crate::upload::{RecordId, UploadEvent, UploadJob, Uploader};
use eframe::{egui, App};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

/// Which of the two panes is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Upload,
    Queue,
}

/// The application: owns the live queue, the staging buffer and the single
/// active-upload slot. Workers run on their own thread with their own tokio
/// runtime and report back over the event channel, drained once per frame.
pub struct TinyDrop {
    view: View,
    queue: QueueState,
    staged: QueueState,
    pending_uploads: usize,
    active: Option<RecordId>,
    uploader: Uploader,
    event_tx: Sender<UploadEvent>,
    event_rx: Receiver<UploadEvent>,
}

impl Default for TinyDrop {
    fn default() -> Self {
        let (event_tx, event_rx) = channel();
        Self {
            view: View::Upload,
            queue: QueueState::default(),
            staged: QueueState::default(),
            pending_uploads: 0,
            active: None,
            uploader: Uploader::from_env(),
            event_tx,
            event_rx,
        }
    }
}

impl TinyDrop {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let app = Self::default();
        log::info!("starting TinyDrop, endpoint {}", app.uploader.endpoint());
        app
    }

    /// Stage files for the confirmation flow (drops and picks in the Upload
    /// view land here first).
    pub fn stage_files(&mut self, files: Vec<IncomingFile>) {
        self.staged.classify(files);
    }

    /// Merge files straight into the live queue (drops while the Queue view
    /// is showing).
    pub fn enqueue_files(&mut self, files: Vec<IncomingFile>) {
        let added = files.len();
        self.queue.classify(files);
        self.pending_uploads += added;
    }

    /// Confirmation: move everything staged into the live queue and switch to
    /// the Queue view so the progress bars are visible.
    pub fn commit_staged(&mut self) {
        let added = self.staged.pending_count();
        let mut staged = std::mem::take(&mut self.staged);
        self.queue.merge(&mut staged);
        self.pending_uploads += added;
        self.view = View::Queue;
    }

    fn handle_event(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Progress { id, percent } => {
                self.queue = self.queue.reconcile(id, RecordUpdate::Progress(percent));
            }
            UploadEvent::Succeeded { id, link } => {
                self.queue = self.queue.reconcile(id, RecordUpdate::Succeeded(link));
                self.finish(id);
            }
            UploadEvent::Failed { id } => {
                self.queue = self.queue.reconcile(id, RecordUpdate::Failed);
                self.finish(id);
            }
        }
    }

    /// Completion hook: free the active slot and drop the pending counter
    /// shown on the Queue tab.
    fn finish(&mut self, id: RecordId) {
        if self.active == Some(id) {
            self.active = None;
        }
        self.pending_uploads = self.pending_uploads.saturating_sub(1);
    }

    /// Select the next record, but only while nothing is in flight. This is
    /// what serializes uploads.
    fn next_job(&mut self) -> Option<UploadJob> {
        if self.active.is_some() {
            return None;
        }
        let job = self.queue.next_uploadable()?;
        self.active = Some(job.id);
        Some(job)
    }

    fn spawn_upload(&self, job: UploadJob) {
        log::debug!("activating upload of {}", job.name);
        let uploader = self.uploader.clone();
        let events = self.event_tx.clone();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(uploader.upload(job, events));
        });
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let events: Vec<UploadEvent> = self.event_rx.try_iter().collect();
        let had_updates = !events.is_empty();
        for event in events {
            self.handle_event(event);
        }

        if let Some(job) = self.next_job() {
            self.spawn_upload(job);
        }

        if had_updates {
            ctx.request_repaint();
        }
        if self.active.is_some() {
            // Keep polling the channel while a worker is running.
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl App for TinyDrop {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::Payload;
    use std::sync::Arc;

    fn file(name: &str) -> IncomingFile {
        IncomingFile {
            name: name.to_string(),
            payload: Payload::Bytes(Arc::from(&b"data"[..])),
            size_bytes: 100,
        }
    }

    #[test]
    fn test_strict_one_at_a_time_ordering() {
        let mut app = TinyDrop::default();
        app.enqueue_files(vec![file("a.pdf"), file("b.pdf"), file("c.pdf")]);

        let a = app.next_job().expect("a should activate");
        assert_eq!(a.name, "a.pdf");
        // While A is active nothing else may be selected.
        assert!(app.next_job().is_none());

        app.handle_event(UploadEvent::Succeeded {
            id: a.id,
            link: "https://tiny.url/a".into(),
        });
        let b = app.next_job().expect("b should activate after a");
        assert_eq!(b.name, "b.pdf");
        assert!(app.next_job().is_none());

        // C must not start before B resolves, even on failure.
        app.handle_event(UploadEvent::Failed { id: b.id });
        let c = app.next_job().expect("c should activate after b");
        assert_eq!(c.name, "c.pdf");
    }

    #[test]
    fn test_completion_hook_decrements_pending() {
        let mut app = TinyDrop::default();
        app.enqueue_files(vec![file("a.pdf"), file("b.pdf")]);
        assert_eq!(app.pending_uploads, 2);

        let a = app.next_job().unwrap();
        app.handle_event(UploadEvent::Succeeded {
            id: a.id,
            link: "https://tiny.url/a".into(),
        });
        assert_eq!(app.pending_uploads, 1);

        let b = app.next_job().unwrap();
        app.handle_event(UploadEvent::Failed { id: b.id });
        assert_eq!(app.pending_uploads, 0);
    }

    #[test]
    fn test_commit_staged_moves_records_and_switches_view() {
        let mut app = TinyDrop::default();
        app.stage_files(vec![file("a.pdf"), file("b.txt")]);
        assert_eq!(app.queue.total_records(), 0);
        assert_eq!(app.pending_uploads, 0);

        app.commit_staged();

        assert!(app.staged.is_empty());
        assert_eq!(app.queue.total_records(), 2);
        assert_eq!(app.pending_uploads, 2);
        assert_eq!(app.view, View::Queue);
    }

    #[test]
    fn test_progress_events_reconcile_into_queue() {
        let mut app = TinyDrop::default();
        app.enqueue_files(vec![file("a.pdf")]);
        let a = app.next_job().unwrap();

        app.handle_event(UploadEvent::Progress {
            id: a.id,
            percent: 37.5,
        });
        let record = app.queue.records().next().unwrap();
        assert_eq!(record.progress, 37.5);
        // Still active: the tick does not free the slot.
        assert!(app.next_job().is_none());
    }

    #[test]
    fn test_final_states_for_success_and_failure() {
        let mut app = TinyDrop::default();
        app.enqueue_files(vec![file("report.pdf"), file("bad.exe")]);

        let report = app.next_job().unwrap();
        app.handle_event(UploadEvent::Progress {
            id: report.id,
            percent: 55.0,
        });
        app.handle_event(UploadEvent::Succeeded {
            id: report.id,
            link: "https://tiny.url/r".into(),
        });

        let bad = app.next_job().unwrap();
        assert_eq!(bad.name, "bad.exe");
        app.handle_event(UploadEvent::Failed { id: bad.id });

        let records: Vec<&UploadRecord> = app.queue.records().collect();
        assert_eq!(records[0].progress, 100.0);
        assert_eq!(records[0].download_link, "https://tiny.url/r");
        assert!(!records[0].failed);

        assert!(records[1].failed);
        assert_eq!(records[1].progress, 0.0);
        assert!(records[1].download_link.is_empty());

        assert!(app.next_job().is_none());
    }

    #[test]
    fn test_classifier_variants_share_one_queue() {
        let mut app = TinyDrop::default();
        app.stage_files(vec![file("a.pdf")]);
        app.commit_staged();
        // Direct merge appends into the group the staged flow created.
        app.enqueue_files(vec![file("b.pdf")]);

        assert_eq!(app.queue.groups.len(), 1);
        assert_eq!(app.queue.groups[0].records.len(), 2);
        assert_eq!(app.pending_uploads, 2);
    }
}
