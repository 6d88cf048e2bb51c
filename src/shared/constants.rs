pub const APP_NAME: &str = "framescribe";

pub const ERROR_LOG_FILE: &str = "framescribe-error.log";
pub const DEBUG_LOG_FILE: &str = "framescribe-debug.log";

pub const DEFAULT_INTERVAL_SECS: f64 = 5.0;
/// Shortest accepted interval; finer sampling only duplicates decoded frames.
pub const MIN_INTERVAL_SECS: f64 = 0.01;
pub const DEFAULT_API_URL: &str = "http://localhost:1234/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_TOKENS: u32 = 1500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Local servers ignore the key, but OpenAI-compatible clients always send one.
pub const PLACEHOLDER_API_KEY: &str = "lm-studio";

pub const OUTPUT_EXTENSION: &str = "csv";
pub const JPEG_QUALITY: i32 = 90;
pub const LIST_SEPARATOR: &str = ", ";

pub const CSV_HEADER: [&str; 6] = [
    "timestamp",
    "title",
    "caption",
    "scene_description",
    "persons",
    "objects",
];

pub const ANNOTATION_KEYS: [&str; 5] = ["title", "caption", "scene_description", "persons", "objects"];

pub const SYSTEM_PROMPT: &str = "You are a video annotator specializing in describing keyframes from \
digitized Super-8 videos that are 40 to 50 years old. These videos capture memories and events \
without audio. Your task is to focus solely on the visual content of the images. Avoid any \
commentary on artistic style, lighting issues, or technical problems such as cuts and artifacts. \
Describe what is happening in the scene, the subjects involved, and the environment in a clear \
and objective manner.";

pub const USER_PROMPT: &str = r#"Analyze the provided image and return a clean JSON object with the following keys:
- "title": A concise, catchy title for the scene (string).
- "caption": A single-sentence summary of the main action or subject (string).
- "scene_description": A detailed paragraph describing the scene, activities, and setting (string).
- "persons": A list of short strings, describing each person visible. If none, return an empty list.
- "objects": A list of short strings, identifying key objects in the scene. If none, return an empty list.

Your response must be ONLY the JSON object, without any additional text or markdown formatting."#;
