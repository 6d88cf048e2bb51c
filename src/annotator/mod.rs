pub mod client;
pub mod parser;
pub mod types;

pub use client::{AnnotationClient, Annotator, AnnotatorConfig};
pub use types::Annotation;
