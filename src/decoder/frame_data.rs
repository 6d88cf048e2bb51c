/// A still image already encoded for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn new(jpeg: Vec<u8>, width: u32, height: u32) -> Self {
        Self { jpeg, width, height }
    }
}

/// One sampled keyframe: the image plus where it sits in the video, in seconds.
#[derive(Clone, Debug)]
pub struct Frame {
    pub timestamp: f64,
    pub image: EncodedImage,
}

impl Frame {
    pub fn new(timestamp: f64, image: EncodedImage) -> Self {
        Self { timestamp, image }
    }
}
