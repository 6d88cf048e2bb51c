pub mod frame_data;
pub mod sampler;
pub mod video;

pub use frame_data::EncodedImage;
pub use sampler::{FrameSampler, FrameSource};
pub use video::{OpenCvSource, VideoInfo};
