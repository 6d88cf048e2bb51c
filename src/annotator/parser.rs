use serde_json::Value;

use super::types::Annotation;

/// Outcome of reading a model reply. Never coerced: either every field was found or
/// the whole reply is kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Parsed(Annotation),
    Unparseable(String),
}

/// Finds the first JSON object in `content` that carries all annotation fields.
///
/// Models like to wrap the object in prose or markdown fences, so every `{` is tried
/// as the start of a value and anything after the value is ignored.
pub fn parse_reply(content: &str) -> ModelReply {
    if let Ok(value) = serde_json::from_str::<Value>(content.trim()) {
        if let Some(annotation) = annotation_from_value(value) {
            return ModelReply::Parsed(annotation);
        }
    }

    for (start, _) in content.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&content[start..]).into_iter::<Value>();
        if let Some(Ok(value)) = values.next() {
            if let Some(annotation) = annotation_from_value(value) {
                return ModelReply::Parsed(annotation);
            }
        }
    }

    ModelReply::Unparseable(content.to_string())
}

fn annotation_from_value(value: Value) -> Option<Annotation> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value::<Annotation>(value)
        .ok()
        .map(Annotation::normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = r#"{"title":"Birthday Cake","caption":"A boy blows out candles.","scene_description":"Kitchen table with a cake.","persons":["boy","woman in apron"],"objects":["cake","candles"]}"#;

    fn expect_parsed(content: &str) -> Annotation {
        match parse_reply(content) {
            ModelReply::Parsed(a) => a,
            ModelReply::Unparseable(raw) => panic!("expected annotation, got raw: {}", raw),
        }
    }

    #[test]
    fn test_clean_object() {
        let a = expect_parsed(CLEAN);
        assert_eq!(a.title, "Birthday Cake");
        assert_eq!(a.persons, vec!["boy", "woman in apron"]);
        assert_eq!(a.objects, vec!["cake", "candles"]);
    }

    #[test]
    fn test_object_inside_prose() {
        let reply = format!("Sure! Here is the annotation you asked for:\n{}\nLet me know if you need more.", CLEAN);
        assert_eq!(expect_parsed(&reply), expect_parsed(CLEAN));
    }

    #[test]
    fn test_object_inside_markdown_fence() {
        let reply = format!("```json\n{}\n```", CLEAN);
        assert_eq!(expect_parsed(&reply).caption, "A boy blows out candles.");
    }

    #[test]
    fn test_braces_in_prose_before_object() {
        let reply = format!("Using the format {{title, caption}} as requested: {}", CLEAN);
        assert_eq!(expect_parsed(&reply).title, "Birthday Cake");
    }

    #[test]
    fn test_wrapped_object_is_found() {
        let reply = format!(r#"{{"annotation": {}}}"#, CLEAN);
        assert_eq!(expect_parsed(&reply).title, "Birthday Cake");
    }

    #[test]
    fn test_empty_lists_are_fine() {
        let a = expect_parsed(r#"{"title":"Empty Beach","caption":"Waves.","scene_description":"Sand.","persons":[],"objects":[]}"#);
        assert!(a.persons.is_empty());
        assert_eq!(a.persons_text(), "");
    }

    #[test]
    fn test_missing_key_is_unparseable() {
        let reply = r#"{"title":"Birthday Cake","caption":"A boy.","persons":[],"objects":[]}"#;
        assert_eq!(parse_reply(reply), ModelReply::Unparseable(reply.to_string()));
    }

    #[test]
    fn test_wrong_shape_is_unparseable() {
        let reply = r#"{"title":"x","caption":"y","scene_description":"z","persons":"nobody","objects":[]}"#;
        assert!(matches!(parse_reply(reply), ModelReply::Unparseable(_)));
    }

    #[test]
    fn test_plain_prose_is_unparseable() {
        let reply = "I'm sorry, I cannot see the image.";
        assert_eq!(parse_reply(reply), ModelReply::Unparseable(reply.to_string()));
    }

    #[test]
    fn test_truncated_object_is_unparseable() {
        let reply = &CLEAN[..CLEAN.len() - 20];
        assert!(matches!(parse_reply(reply), ModelReply::Unparseable(_)));
    }
}
