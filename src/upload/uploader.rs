use crate::upload::types::{Payload, RecordId, UploadEvent, UploadJob};
use rand::Rng;
use serde::Deserialize;
use std::ops::Range;
use std::sync::mpsc::Sender;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/upload";

/// Assumed transfer rate (KiB/s) shaping the simulated progress curve.
const ASSUMED_RATE_BYTES_PER_SEC: u64 = 800;

/// Simulated progress stalls here until the server answers.
const PROGRESS_CEILING: f32 = 99.0;

/// Delay between simulated ticks, drawn uniformly per tick.
const TICK_DELAY_MS: Range<u64> = 300..1300;

/// Everything that can go wrong during one upload. The queue does not
/// distinguish between these: each one ends the record in the failed state.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upload rejected with status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "tinyURL")]
    tiny_url: String,
}

#[derive(Clone)]
pub struct Uploader {
    endpoint: String,
}

impl Uploader {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint from `TINYDROP_ENDPOINT`, falling back to the local default.
    pub fn from_env() -> Self {
        let endpoint =
            std::env::var("TINYDROP_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload one record, reporting progress and the terminal outcome over
    /// `events`. A ticker task feeds simulated progress while the request is
    /// in flight and is aborted the moment the request resolves, so no tick
    /// can be emitted after the terminal event.
    pub async fn upload(&self, job: UploadJob, events: Sender<UploadEvent>) {
        let ticker = tokio::spawn(simulate_progress(job.id, job.size_bytes, events.clone()));

        let result = self.send(&job).await;
        ticker.abort();

        let event = match result {
            Ok(link) => {
                log::info!("uploaded {} -> {}", job.name, link);
                UploadEvent::Succeeded { id: job.id, link }
            }
            Err(e) => {
                log::warn!("upload of {} failed: {}", job.name, e);
                UploadEvent::Failed { id: job.id }
            }
        };
        events.send(event).unwrap_or_default();
    }

    async fn send(&self, job: &UploadJob) -> Result<String, UploadError> {
        let bytes = read_payload(job).await?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(job.name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let client = reqwest::Client::new();
        let response = client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status));
        }

        let body: UploadResponse = response.json().await?;
        Ok(body.tiny_url)
    }
}

async fn read_payload(job: &UploadJob) -> Result<Vec<u8>, UploadError> {
    match &job.payload {
        Payload::Bytes(bytes) => Ok(bytes.to_vec()),
        Payload::Path(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| UploadError::Read {
                    name: job.name.clone(),
                    source,
                })
        }
    }
}

/// Per-tick increment of the simulated curve. Small files jump to the ceiling
/// in one tick, large files creep up at the assumed rate.
fn progress_increment(size_bytes: u64) -> f32 {
    let rate = ASSUMED_RATE_BYTES_PER_SEC as f32;
    100.0 * (rate * 1024.0) / (size_bytes as f32 + 4.0 * rate)
}

async fn simulate_progress(id: RecordId, size_bytes: u64, events: Sender<UploadEvent>) {
    let increment = progress_increment(size_bytes);
    let mut percent = 0.0_f32;

    while percent < PROGRESS_CEILING {
        let delay = rand::thread_rng().gen_range(TICK_DELAY_MS);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        percent = (percent + increment).min(PROGRESS_CEILING);
        if events.send(UploadEvent::Progress { id, percent }).is_err() {
            break;
        }
    }
}
