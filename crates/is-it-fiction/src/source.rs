use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use thiserror::Error;
use tracing::debug;

/// Upper bound on documents fetched per account handle, matching the
/// timeline page size the classifier was tuned against.
pub const RECENT_DOCUMENT_LIMIT: usize = 200;

/// A single unit of input text: one post, or one user-submitted text block.
///
/// The id is the opaque platform post identifier, present only for
/// documents that came from an account timeline; it is used to build
/// permalinks and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }

    pub fn with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
        }
    }
}

/// Errors raised by a document source. Fetch failures abort the request;
/// there is no retry policy at this layer.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The handle has no reachable backing data.
    #[error("document source unavailable: {0}")]
    Unavailable(String),

    /// A record was present but could not be decoded.
    #[error("malformed document record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Supplier of the most recent documents for an account handle.
///
/// Network-backed implementations live outside this crate; the classifier
/// only consumes the already-fetched ordered sequence.
pub trait DocumentSource {
    fn recent_documents(&self, handle: &str, limit: usize) -> Result<Vec<Document>, SourceError>;
}

/// Offline document source reading `<dir>/<handle>.jsonl`, one JSON object
/// per line with `id` and `text` fields. Line order is the timeline order.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    dir: PathBuf,
}

impl JsonlSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for JsonlSource {
    fn recent_documents(&self, handle: &str, limit: usize) -> Result<Vec<Document>, SourceError> {
        if handle.is_empty()
            || !handle
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(SourceError::Unavailable(format!(
                "invalid handle {handle:?}"
            )));
        }

        let path = self.dir.join(format!("{handle}.jsonl"));
        let file = File::open(&path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;

        let mut documents = Vec::new();
        for line in BufReader::new(file).lines() {
            let line =
                line.map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;
            if line.trim().is_empty() {
                continue;
            }
            documents.push(serde_json::from_str::<Document>(&line)?);
            if documents.len() == limit {
                break;
            }
        }
        debug!(handle, count = documents.len(), "loaded documents");
        Ok(documents)
    }
}
