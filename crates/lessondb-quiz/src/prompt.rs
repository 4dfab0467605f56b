use lessondb_core::types::Topic;

pub const QUESTION_SCHEMA: &str =
    r#"{"questions":[{"question":"...","options":["A","B","C","D"],"answerIndex":0,"explanation":"..."}]}"#;

/// Collapse whitespace runs to single spaces and keep at most `max_chars` characters.
pub fn material_excerpt(content: &str, max_chars: usize) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

pub fn build_prompt(topic: &Topic, count: usize, difficulty: &str, excerpt_chars: usize) -> String {
    let (course_title, course_subject) = topic
        .course
        .as_ref()
        .map(|c| (c.title.as_str(), c.subject.as_str()))
        .unwrap_or(("Course", "Subject"));
    let excerpt = topic
        .material
        .as_ref()
        .map(|m| material_excerpt(&m.content, excerpt_chars))
        .unwrap_or_default();

    let mut lines = vec![
        "You are an expert educator creating a quiz for students.".to_string(),
        format!("Generate {} multiple-choice questions at {} difficulty.", count, difficulty),
        "Each question must have 4 options and one correct answer.".to_string(),
        "Return strict JSON only with this structure:".to_string(),
        QUESTION_SCHEMA.to_string(),
        "Do not include markdown or code fences.".to_string(),
        format!("Course: {} ({})", course_title, course_subject),
        format!("Topic: {}", topic.title),
    ];
    if let Some(description) = topic.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        lines.push(format!("Topic Description: {}", description));
    }
    if !excerpt.is_empty() {
        lines.push(format!("Material Context: {}", excerpt));
    }
    lines.join("\n")
}
