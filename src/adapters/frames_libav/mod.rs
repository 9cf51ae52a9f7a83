//! Frame sampling adapter using libav bindings
//!
//! Decodes a clip with `ffmpeg-next`, keeps every `interval`-th frame and returns the kept
//! frames as base64 JPEG data URLs ready for a vision model.

use std::path::{Path, PathBuf};
use std::sync::Once;

use async_trait::async_trait;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use ffmpeg_next::{self as ffmpeg, codec, decoder, format, media, rescale, software};
use ffmpeg_next::util::frame::video::Video;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use tracing::debug;

use crate::domain::model::EncodedFrame;
use crate::domain::rules::{frame_interval, should_sample_frame};
use crate::error::{MovieError, MovieResult};
use crate::ports::FrameSamplerPort;

static INIT: Once = Once::new();

/// Initialise libav once per process
pub fn init() {
    INIT.call_once(|| {
        if let Err(e) = ffmpeg::init() {
            tracing::error!("Failed to initialize FFmpeg libraries: {}", e);
        }
    });
}

/// libav-based frame sampler
pub struct LibavFrameSampler {
    jpeg_quality: u8,
}

impl LibavFrameSampler {
    /// Create new frame sampler
    pub fn new() -> Self {
        init();
        Self { jpeg_quality: 90 }
    }

    /// Set JPEG quality (1-100)
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

impl Default for LibavFrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameSamplerPort for LibavFrameSampler {
    async fn sample_frames(&self, clip: &Path, max_frames: usize) -> MovieResult<Vec<EncodedFrame>> {
        let clip: PathBuf = clip.to_path_buf();
        let quality = self.jpeg_quality;
        let path_for_error = clip.display().to_string();
        tokio::task::spawn_blocking(move || sample_frames_blocking(&clip, max_frames, quality))
            .await
            .map_err(|e| MovieError::FrameSampling {
                path: path_for_error,
                message: format!("sampling task failed: {}", e),
            })?
    }
}

fn sample_frames_blocking(
    path: &Path,
    max_frames: usize,
    jpeg_quality: u8,
) -> MovieResult<Vec<EncodedFrame>> {
    let fail = |message: String| MovieError::FrameSampling {
        path: path.display().to_string(),
        message,
    };

    let mut input = format::input(&path).map_err(|e| fail(e.to_string()))?;

    let stream = input
        .streams()
        .best(media::Type::Video)
        .ok_or_else(|| fail("no video stream".to_string()))?;
    let stream_index = stream.index();
    let total_frames = estimate_total_frames(stream.frames(), stream.avg_frame_rate(), input.duration());
    let mut decoder = codec::context::Context::from_parameters(stream.parameters())
        .and_then(|context| context.decoder().video())
        .map_err(|e| fail(e.to_string()))?;

    let mut scaler = software::scaling::context::Context::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        format::Pixel::RGB24,
        decoder.width(),
        decoder.height(),
        software::scaling::Flags::BILINEAR,
    )
    .map_err(|e| fail(e.to_string()))?;

    let interval = frame_interval(total_frames, max_frames);
    debug!(
        "Sampling {}: {} frames, interval {}, cap {}",
        path.display(),
        total_frames,
        interval,
        max_frames
    );

    let mut sampled = Vec::with_capacity(max_frames);
    let mut frame_index = 0u64;

    let mut receive_decoded_frames = |decoder: &mut decoder::Video,
                                      sampled: &mut Vec<EncodedFrame>|
     -> Result<(), String> {
        let mut decoded = Video::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            if should_sample_frame(frame_index, interval, sampled.len(), max_frames) {
                let mut rgb = Video::empty();
                scaler.run(&decoded, &mut rgb).map_err(|e| e.to_string())?;
                let jpeg = encode_jpeg(&rgb, jpeg_quality)?;
                sampled.push(EncodedFrame::from_base64_jpeg(&BASE64_STANDARD.encode(jpeg)));
            }
            frame_index += 1;
        }
        Ok(())
    };

    for (stream, packet) in input.packets() {
        if sampled.len() >= max_frames {
            break;
        }
        if stream.index() != stream_index {
            continue;
        }
        decoder.send_packet(&packet).map_err(|e| fail(e.to_string()))?;
        receive_decoded_frames(&mut decoder, &mut sampled).map_err(fail)?;
    }
    decoder.send_eof().map_err(|e| fail(e.to_string()))?;
    receive_decoded_frames(&mut decoder, &mut sampled).map_err(fail)?;

    if sampled.is_empty() {
        return Err(fail("no frames could be decoded".to_string()));
    }
    Ok(sampled)
}

/// Frame count from stream metadata, else duration times average frame rate
fn estimate_total_frames(stream_frames: i64, avg_frame_rate: ffmpeg::Rational, duration: i64) -> u64 {
    if stream_frames > 0 {
        return stream_frames as u64;
    }
    let fps = if avg_frame_rate.denominator() != 0 {
        f64::from(avg_frame_rate)
    } else {
        0.0
    };
    let seconds = duration.max(0) as f64 * f64::from(rescale::TIME_BASE);
    (seconds * fps).floor().max(0.0) as u64
}

/// Copy the visible RGB rows out of a possibly padded frame buffer
fn packed_rgb(frame: &Video) -> Vec<u8> {
    let row_bytes = frame.width() as usize * 3;
    let stride = frame.stride(0);
    let data = frame.data(0);
    (0..frame.height() as usize)
        .flat_map(|row| &data[row * stride..row * stride + row_bytes])
        .copied()
        .collect()
}

fn encode_jpeg(frame: &Video, quality: u8) -> Result<Vec<u8>, String> {
    let rgb = packed_rgb(frame);
    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
    encoder
        .encode(&rgb, frame.width(), frame.height(), ExtendedColorType::Rgb8)
        .map_err(|e| e.to_string())?;
    Ok(jpeg)
}
