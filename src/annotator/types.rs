//! Annotation model and the OpenAI-compatible chat-completions wire types.

use serde::{Deserialize, Serialize};

use crate::shared::constants;

/// What the model says about one frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Annotation {
    pub title: String,
    pub caption: String,
    pub scene_description: String,
    pub persons: Vec<String>,
    pub objects: Vec<String>,
}

impl Annotation {
    /// Trims every field and turns the label lists into ordered sets (first mention wins).
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            caption: self.caption.trim().to_string(),
            scene_description: self.scene_description.trim().to_string(),
            persons: dedup_labels(self.persons),
            objects: dedup_labels(self.objects),
        }
    }

    pub fn persons_text(&self) -> String {
        self.persons.join(constants::LIST_SEPARATOR)
    }

    pub fn objects_text(&self) -> String {
        self.objects.join(constants::LIST_SEPARATOR)
    }
}

fn dedup_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|seen| seen == label) {
            out.push(label.to_string());
        }
    }
    out
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: &str) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.to_string()),
        }
    }

    pub fn user_with_image(text: &str, jpeg_base64: &str) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: text.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/jpeg;base64,{}", jpeg_base64),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}
