use serde_json::Value;

use crate::chain::AttemptError;

/// Parse the JSON object spanning the first `{` to the last `}` of `text`.
///
/// Tolerates prose and code fences around the object.
pub fn extract_json(text: &str) -> Result<Value, AttemptError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(AttemptError::Parse("no JSON object delimiters in response".into()));
    };
    if end <= start {
        return Err(AttemptError::Parse("JSON object delimiters out of order".into()));
    }
    serde_json::from_str(&text[start..=end]).map_err(|e| AttemptError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prose_and_code_fences() {
        let text = "Sure! ```json {\"questions\":[{\"question\":\"q\"}]} ``` Hope that helps.";
        let value = extract_json(text).unwrap();
        assert_eq!(value["questions"][0]["question"], "q");
    }

    #[test]
    fn nested_braces_use_outermost_pair() {
        let value = extract_json("x {\"a\":{\"b\":1}} y").unwrap();
        assert_eq!(value["a"]["b"], 1);
    }

    #[test]
    fn missing_or_reversed_delimiters_fail() {
        assert!(matches!(extract_json("no json here"), Err(AttemptError::Parse(_))));
        assert!(matches!(extract_json("} reversed {"), Err(AttemptError::Parse(_))));
    }

    #[test]
    fn invalid_json_between_delimiters_fails() {
        assert!(matches!(extract_json("{ questions: [ }"), Err(AttemptError::Parse(_))));
    }
}
