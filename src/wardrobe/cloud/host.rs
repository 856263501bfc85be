//! Host transport seam for cloud file operations.
//!
//! The platform provides an upload primitive (destination URL, local
//! file handle, form field name, extra cloud path) with success/failure
//! callbacks and an optional progress subscription, and a delete
//! primitive reporting a per-file status list. [`UploadHost`] expresses
//! that contract as an async trait so tests can substitute mocks.

use async_trait::async_trait;
use thiserror::Error;

/// Error reported by the host transport itself (network failure,
/// refused call), as opposed to an unhappy response body.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Raw progress sink: percentages 0-100 as the host reports them.
pub type ProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// One outgoing upload call.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Destination URL of the upload endpoint.
    pub url: String,
    /// Local file handle passed through to the host.
    pub file_path: String,
    /// Multipart field name, always `file`.
    pub field_name: String,
    /// Destination path within the cloud bucket.
    pub cloud_path: String,
}

/// What the host's success callback carries. The body is host-defined
/// JSON text; interpreting it is the caller's job.
#[derive(Debug, Clone)]
pub struct UploadResponse {
    pub status_code: u16,
    pub body: String,
}

/// Per-file outcome of a delete call. Status 0 means deleted.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub path: String,
    pub status: i32,
    pub message: Option<String>,
}

#[async_trait]
pub trait UploadHost: Send + Sync {
    /// Run one upload to completion. Implementations must wire
    /// `on_progress` before the first progress event can fire.
    async fn upload_file(
        &self,
        request: &UploadRequest,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<UploadResponse, TransportError>;

    /// Delete the given cloud paths, one outcome per path.
    async fn delete_files(&self, paths: &[String]) -> Result<Vec<DeleteOutcome>, TransportError>;
}
