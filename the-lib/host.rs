//! Host document-open contract.

use thiserror::Error;

use crate::position::Position;

/// Request to bring a document into focus with the caret at `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
  pub path:         String,
  pub editor_index: usize,
  pub position:     Position,
}

/// The host application's open-by-path machinery.
///
/// Implementations open the document if needed, wait until its editor is
/// ready and then place the caret. Called from the UI thread only.
pub trait DocumentHost {
  fn open(&self, request: &OpenRequest) -> Result<(), HostError>;
}

#[derive(Debug, Error)]
pub enum HostError {
  #[error("document not found: {0}")]
  NotFound(String),
  #[error("host refused to open {path}: {reason}")]
  Rejected { path: String, reason: String },
}
