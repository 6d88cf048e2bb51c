pub mod file_utils;
pub mod logger;
pub mod time_utils;
