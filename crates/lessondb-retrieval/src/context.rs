use std::fmt::Write;

use lessondb_core::types::RetrievedChunk;

pub const NO_MATERIAL_FOUND: &str = "No relevant course materials found.";

/// Render ranked chunks as one prompt-ready block, numbered from 1 with
/// provenance headers, in input order.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return NO_MATERIAL_FOUND.to_string();
    }

    let mut context = String::from("Relevant Course Material Context:\n\n");
    for (i, chunk) in chunks.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(
            context,
            "[Source {}: {} - {}/{}]",
            i + 1,
            chunk.material_title,
            chunk.subject,
            chunk.topic
        );
        let _ = write!(context, "{}\n\n", chunk.content);
    }
    context
}
