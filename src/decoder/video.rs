use opencv::{core, imgcodecs, imgproc, prelude::*, videoio};
use std::path::Path;

use super::frame_data::EncodedImage;
use super::sampler::FrameSource;
use crate::error::{PipelineError, PipelineResult};
use crate::shared::constants;
use crate::utils::logger;

#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub path: String,
    pub fps: f64,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
}

impl VideoInfo {
    pub fn duration_secs(&self) -> f64 {
        self.frame_count as f64 / self.fps
    }
}

/// OpenCV-backed video that seeks to a frame index per request.
pub struct OpenCvSource {
    capture: videoio::VideoCapture,
    info: VideoInfo,
    max_dimension: u32,
}

impl OpenCvSource {
    /// `max_dimension == 0` keeps frames at native resolution.
    pub fn open(path: &Path, max_dimension: u32) -> PipelineResult<Self> {
        let path_str = path.to_string_lossy().to_string();
        let open_err = |reason: String| PipelineError::MediaOpen {
            path: path_str.clone(),
            reason,
        };

        if !path.is_file() {
            return Err(open_err("file not found".to_string()));
        }

        logger::debug(&format!("Opening video with OpenCV: {}", path_str));

        let capture = videoio::VideoCapture::from_file(&path_str, videoio::CAP_ANY)
            .map_err(|e| open_err(e.to_string()))?;
        if !capture.is_opened().map_err(|e| open_err(e.to_string()))? {
            return Err(open_err("not a decodable video".to_string()));
        }

        let prop = |id: i32| capture.get(id).map_err(|e| open_err(e.to_string()));
        let fps = prop(videoio::CAP_PROP_FPS)?;
        let frame_count = prop(videoio::CAP_PROP_FRAME_COUNT)?;
        let width = prop(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = prop(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;

        // Some containers report 0 or garbage; without both values there is no duration.
        if !(fps.is_finite() && fps > 0.0) || !(frame_count.is_finite() && frame_count >= 1.0) {
            return Err(open_err(format!(
                "cannot determine duration (fps={}, frames={})",
                fps, frame_count
            )));
        }

        let info = VideoInfo {
            path: path_str.clone(),
            fps,
            frame_count: frame_count as u64,
            width,
            height,
        };

        logger::info(&format!(
            "Video opened: {}x{} @ {:.2} fps, {} frames ({:.2}s)",
            info.width,
            info.height,
            info.fps,
            info.frame_count,
            info.duration_secs()
        ));

        Ok(Self {
            capture,
            info,
            max_dimension,
        })
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn frame_index(&self, timestamp: f64) -> u64 {
        let index = (timestamp * self.info.fps).floor().max(0.0) as u64;
        index.min(self.info.frame_count.saturating_sub(1))
    }

    fn downscale(&self, frame: Mat) -> opencv::Result<Mat> {
        let (w, h) = (frame.cols() as u32, frame.rows() as u32);
        let (new_w, new_h) = fit_within(w, h, self.max_dimension);
        if (new_w, new_h) == (w, h) {
            return Ok(frame);
        }

        let mut resized = Mat::default();
        imgproc::resize(
            &frame,
            &mut resized,
            core::Size::new(new_w as i32, new_h as i32),
            0.0,
            0.0,
            imgproc::INTER_AREA,
        )?;
        Ok(resized)
    }

    fn encode_jpeg(frame: &Mat) -> opencv::Result<Option<Vec<u8>>> {
        let mut buffer = core::Vector::<u8>::new();
        let params = core::Vector::<i32>::from_slice(&[
            imgcodecs::IMWRITE_JPEG_QUALITY,
            constants::JPEG_QUALITY,
        ]);
        if !imgcodecs::imencode(".jpg", frame, &mut buffer, &params)? {
            return Ok(None);
        }
        Ok(Some(buffer.to_vec()))
    }
}

impl FrameSource for OpenCvSource {
    fn duration_secs(&self) -> f64 {
        self.info.duration_secs()
    }

    fn grab_at(&mut self, timestamp: f64) -> PipelineResult<EncodedImage> {
        let read_err = |reason: String| PipelineError::MediaRead { timestamp, reason };

        // 1. Seek
        let frame_id = self.frame_index(timestamp);
        self.capture
            .set(videoio::CAP_PROP_POS_FRAMES, frame_id as f64)
            .map_err(|e| read_err(e.to_string()))?;

        // 2. Decode
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame).map_err(|e| read_err(e.to_string()))? || frame.empty() {
            return Err(read_err(format!("no frame decoded at index {}", frame_id)));
        }

        // 3. Resize + encode
        let frame = self.downscale(frame).map_err(|e| read_err(e.to_string()))?;
        let jpeg = Self::encode_jpeg(&frame)
            .map_err(|e| read_err(e.to_string()))?
            .ok_or_else(|| read_err("JPEG encoding failed".to_string()))?;

        logger::debug(&format!(
            "Grabbed frame {} at {:.2}s ({} bytes)",
            frame_id,
            timestamp,
            jpeg.len()
        ));

        Ok(EncodedImage::new(jpeg, frame.cols() as u32, frame.rows() as u32))
    }
}

impl Drop for OpenCvSource {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            logger::error(&format!("Failed to release video {}: {}", self.info.path, e));
        } else {
            logger::debug(&format!("Video released: {}", self.info.path));
        }
    }
}

/// Aspect-preserving size whose longest side is at most `max_dimension` (0 = unlimited).
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if max_dimension == 0 || longest <= max_dimension {
        return (width, height);
    }
    let scale = max_dimension as f64 / longest as f64;
    let new_w = ((width as f64 * scale).round() as u32).max(1);
    let new_h = ((height as f64 * scale).round() as u32).max(1);
    (new_w, new_h)
}
