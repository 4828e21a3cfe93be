//! Frame encoding: raw RGB frames to still PNG images.
//!
//! Pure transformation with no side effects; the same frame always encodes
//! to the same payload.

use std::fmt;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{ImageBuffer, ImageFormat, Rgb};

use crate::camera::Frame;

/// An encoded still image produced from a captured frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// PNG-encoded bytes
    pub data: Vec<u8>,
    /// Width in pixels (native frame resolution)
    pub width: u32,
    /// Height in pixels (native frame resolution)
    pub height: u32,
}

impl EncodedImage {
    pub fn mime(&self) -> &'static str {
        "image/png"
    }

    /// Render as a base64 data URL, the form the persistence API accepts
    /// as an `imageReference`.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime(), BASE64.encode(&self.data))
    }
}

/// Errors that can occur while encoding a frame.
#[derive(Debug)]
pub enum EncodeError {
    /// The frame has zero width or height
    EmptyFrame { width: u32, height: u32 },
    /// The PNG writer rejected the frame data
    WriteFailed(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::EmptyFrame { width, height } => {
                write!(f, "Cannot encode empty frame ({}x{})", width, height)
            }
            EncodeError::WriteFailed(msg) => write!(f, "PNG encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Encode a captured RGB frame as a PNG image at its native resolution.
pub fn encode_frame(frame: &Frame) -> Result<EncodedImage, EncodeError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(EncodeError::EmptyFrame {
            width: frame.width,
            height: frame.height,
        });
    }

    let buffer: ImageBuffer<Rgb<u8>, _> =
        ImageBuffer::from_raw(frame.width, frame.height, frame.data.clone()).ok_or_else(|| {
            EncodeError::WriteFailed(format!(
                "frame data length {} does not match {}x{} RGB",
                frame.data.len(),
                frame.width,
                frame.height
            ))
        })?;

    let mut data = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .map_err(|e| EncodeError::WriteFailed(e.to_string()))?;

    Ok(EncodedImage {
        data,
        width: frame.width,
        height: frame.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FrameFormat;
    use std::time::Instant;

    fn rgb_frame(width: u32, height: u32) -> Frame {
        Frame {
            data: vec![128; (width * height * 3) as usize],
            width,
            height,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn test_encode_produces_png_at_native_resolution() {
        let image = encode_frame(&rgb_frame(4, 2)).unwrap();
        assert_eq!(image.width, 4);
        assert_eq!(image.height, 2);
        // PNG magic bytes
        assert_eq!(&image.data[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let frame = rgb_frame(3, 3);
        let a = encode_frame(&frame).unwrap();
        let b = encode_frame(&frame).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_dimension_frame_is_rejected() {
        let frame = Frame {
            data: Vec::new(),
            width: 0,
            height: 0,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        };
        let err = encode_frame(&frame).unwrap_err();
        assert!(matches!(err, EncodeError::EmptyFrame { .. }));
    }

    #[test]
    fn test_truncated_data_is_rejected() {
        let frame = Frame {
            data: vec![0; 5], // not a multiple of 3*width*height
            width: 2,
            height: 2,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        };
        assert!(matches!(
            encode_frame(&frame),
            Err(EncodeError::WriteFailed(_))
        ));
    }

    #[test]
    fn test_data_url_shape() {
        let image = encode_frame(&rgb_frame(1, 1)).unwrap();
        let url = image.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }
}
