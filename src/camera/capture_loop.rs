//! Background capture thread implementation.
//!
//! The thread spawned here is the only owner of the underlying
//! `nokhwa::Camera` stream handle; it decodes the newest frame into a shared
//! buffer and releases the stream when signalled, when a stop command
//! arrives, or when it exits for any other reason.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::types::{CaptureError, Frame, FrameFormat, Resolution};

/// Commands sent to the capture thread.
pub(crate) enum CaptureCommand {
    Stop,
}

/// Settings handed to the capture thread by the session.
#[derive(Debug, Clone)]
pub(crate) struct LoopSettings {
    pub device_index: u32,
    pub resolution: Resolution,
    pub fps: u32,
    /// Flip frames horizontally (front camera).
    pub mirror: bool,
}

/// Run the capture loop in a background thread.
pub(crate) fn run_capture_loop(
    settings: LoopSettings,
    buffer: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    rx: Receiver<CaptureCommand>,
    info_tx: Sender<Result<Resolution, CaptureError>>,
) {
    let index = CameraIndex::Index(settings.device_index);

    let mut camera = match open_camera_with_fallback(&index, &settings) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = info_tx.send(Err(CaptureError::AcquisitionFailed(e.to_string())));
        return;
    }

    // Report the actual resolution the camera settled on
    let res = camera.resolution();
    let _ = info_tx.send(Ok(Resolution {
        width: res.width(),
        height: res.height(),
    }));

    while !stop.load(Ordering::Relaxed) {
        // Check for commands (non-blocking)
        if let Ok(CaptureCommand::Stop) = rx.try_recv() {
            break;
        }

        if let Ok(raw_frame) = camera.frame() {
            if let Some(mut frame) = decode_rgb(&raw_frame) {
                if settings.mirror {
                    mirror_horizontal(&mut frame);
                }
                if let Ok(mut buf) = buffer.lock() {
                    *buf = Some(frame);
                }
            }
            // A frame that fails to decode is skipped; the next one replaces it
        }

        thread::sleep(Duration::from_millis(1));
    }

    // Releases the stream handle before the thread exits
    let _ = camera.stop_stream();
}

/// Decode a nokhwa buffer into an RGB `Frame`.
///
/// nokhwa's `decode_image` converts from whatever native format the camera
/// produced (MJPEG, YUYV, NV12, ...). Returns `None` on corrupt data.
fn decode_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        format: FrameFormat::Rgb,
        timestamp: Instant::now(),
    })
}

/// Mirror a frame horizontally (front-camera preview orientation).
fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let bpp = frame.bytes_per_pixel();

    for y in 0..height {
        let row_start = y * width * bpp;
        let row = &mut frame.data[row_start..row_start + width * bpp];

        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &LoopSettings,
) -> Result<Camera, CaptureError> {
    // Format strategies in order of preference:
    // 1. Closest match with NV12 (common on macOS)
    // 2. Closest match with MJPEG (widely supported)
    // 3. Highest resolution available (let camera decide format)
    let format_attempts: Vec<RequestedFormat> = vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height),
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height),
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;

    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    let e = last_error.expect("format_attempts is non-empty");
    let msg = e.to_string().to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
    {
        Err(CaptureError::PermissionDenied)
    } else {
        Err(CaptureError::AcquisitionFailed(e.to_string()))
    }
}
