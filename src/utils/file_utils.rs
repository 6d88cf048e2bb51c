use std::path::{Path, PathBuf};

use crate::shared::constants;

/// `home/reel.mp4` -> `home/reel.csv`. Only the last extension is replaced.
pub fn output_path_for(video: &Path) -> PathBuf {
    video.with_extension(constants::OUTPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_same_dir_and_stem() {
        assert_eq!(
            output_path_for(Path::new("/videos/1978/summer.mp4")),
            PathBuf::from("/videos/1978/summer.csv")
        );
    }

    #[test]
    fn test_output_path_without_extension() {
        assert_eq!(output_path_for(Path::new("clip")), PathBuf::from("clip.csv"));
    }

    #[test]
    fn test_output_path_keeps_inner_dots() {
        assert_eq!(
            output_path_for(Path::new("reel.part1.avi")),
            PathBuf::from("reel.part1.csv")
        );
    }
}
