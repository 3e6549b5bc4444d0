mod types;
mod uploader;

pub use types::{Payload, RecordId, UploadEvent, UploadJob};
pub use uploader::{Uploader, DEFAULT_ENDPOINT};
