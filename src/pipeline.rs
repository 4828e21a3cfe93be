//! The capture-to-inventory scan pipeline.
//!
//! Wires the capture session, frame encoder, recognition endpoint, and
//! draft builder together: one call takes the live camera frame all the way
//! to a populated draft record ready for review and submission.

use crate::api::{ApiClient, ApiError, ScanResponse};
use crate::camera::{CaptureError, CaptureSession};
use crate::draft::DraftRecord;

/// Errors from the scan pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Capturing or encoding the frame failed; the session is back in a
    /// retryable state.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// The recognition endpoint failed. The captured image stays staged on
    /// the draft so the user can finish the entry manually.
    #[error("Scan failed: {0}")]
    Recognition(#[source] ApiError),
}

/// Capture a frame from the active session and populate `draft` from the
/// recognition result.
///
/// The session must have been started by the caller; the capture itself
/// releases the stream, so the camera is free again by the time the
/// recognition request goes out. Recognition is never retried here - on
/// failure the user re-attempts the capture or falls back to manual entry,
/// with the captured image still staged.
pub async fn scan_item(
    session: &mut CaptureSession,
    client: &ApiClient,
    draft: &mut DraftRecord,
) -> Result<ScanResponse, ScanError> {
    let image = session.capture_frame()?;
    log::info!(
        "Captured {}x{} frame ({} bytes encoded)",
        image.width,
        image.height,
        image.data.len()
    );

    draft.stage_image(image.to_data_url());

    match client.scan(&image).await {
        Ok(response) => {
            response.apply_to(draft);
            log::info!("Recognition extracted '{}'", draft.name);
            Ok(response)
        }
        Err(e) => Err(ScanError::Recognition(e)),
    }
}
