// Prompt text built from retrieved content

use crate::backend::RetrievedChunk;

const CONTEXT_HEADER: &str = "Relevant information from the website:\n\n";
const CONTEXT_PREAMBLE: &str = "You have access to the following information from this website:\n\n";
const CITATION_INSTRUCTION: &str =
    "When using information from these sources, please cite them with their URLs.";
const INDEXED_ONLY_INSTRUCTION: &str = "IMPORTANT: Only use information from the sources provided above. Do not use general knowledge outside of what's provided.";

/// Characters of chunk content included in a prompt
pub const MAX_CHUNK_CHARS: usize = 500;
const TRUNCATION_MARKER: &str = "...";

/// First [`MAX_CHUNK_CHARS`] characters, with `...` when cut
pub fn truncate_content(content: &str) -> String {
    match content.char_indices().nth(MAX_CHUNK_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

/// Render chunks as numbered sources
///
/// Empty input yields an empty string.
pub fn build_context(chunks: &[RetrievedChunk], include_citations: bool) -> String {
    if chunks.is_empty() {
        return String::new();
    }

    let mut context = String::from(CONTEXT_HEADER);
    for (i, chunk) in chunks.iter().enumerate() {
        context.push_str(&format!("Source {}: {}\n", i + 1, chunk.title));
        context.push_str(&truncate_content(&chunk.content));
        context.push('\n');
        if include_citations {
            context.push_str(&format!("URL: {}\n", chunk.url));
        }
        context.push('\n');
    }
    context
}

/// Base prompt followed by the context block and any instructions
pub fn compose_enhanced_prompt(
    base_prompt: &str,
    context: &str,
    cite_sources: bool,
    only_indexed_content: bool,
) -> String {
    let mut prompt = format!("{base_prompt}\n\n{CONTEXT_PREAMBLE}{context}");
    if cite_sources {
        prompt.push('\n');
        prompt.push_str(CITATION_INSTRUCTION);
    }
    if only_indexed_content {
        prompt.push('\n');
        prompt.push_str(INDEXED_ONLY_INSTRUCTION);
    }
    prompt
}
