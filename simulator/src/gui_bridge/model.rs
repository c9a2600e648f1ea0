use serde::{Deserialize, Serialize};

/// Body returned by `POST /ingest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReply {
    pub status: String,
}

impl IngestReply {
    pub fn queued() -> Self {
        Self {
            status: "queued".into(),
        }
    }
}
