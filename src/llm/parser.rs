//! Response parsing for LLM outputs.
//!
//! Turns raw LLM text into candidate SQL. Fenced code blocks are unwrapped
//! by dropping their delimiter lines; interior lines are never rewritten.

/// Fence delimiter used by markdown code blocks.
const FENCE: &str = "```";

/// A fenced block found inside a response.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CodeBlock {
    /// Language tag after the opening fence (may be empty).
    lang: String,
    /// Lines between the fences, joined with `\n`.
    body: String,
}

/// Extracts the candidate query text from an LLM response.
///
/// - The first closed `sql` block (or untagged block) is used, even when
///   prose follows it.
/// - A response that opens with a fence but never closes it is unwrapped.
/// - Otherwise the trimmed response is returned unchanged.
pub fn extract_query(response: &str) -> String {
    let trimmed = response.trim();
    let blocks = code_blocks(trimmed);
    let leading_fence = trimmed.starts_with(FENCE);

    let preferred = blocks
        .iter()
        .find(|b| b.lang.eq_ignore_ascii_case("sql"))
        .or_else(|| blocks.iter().find(|b| b.lang.is_empty()))
        .or_else(|| blocks.first().filter(|_| leading_fence));

    match preferred {
        Some(block) => block.body.trim().to_string(),
        None if leading_fence => strip_code_fence(trimmed),
        None => trimmed.to_string(),
    }
}

/// Removes the opening and closing fence lines of a wrapped response.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let lines: Vec<&str> = trimmed.lines().collect();

    if lines.len() == 1 {
        let inner = lines[0].strip_prefix(FENCE).unwrap_or(lines[0]);
        let inner = inner.strip_suffix(FENCE).unwrap_or(inner);
        return inner.trim().to_string();
    }

    let start = usize::from(lines.first().is_some_and(|l| l.trim_start().starts_with(FENCE)));
    let end = if lines.len() > start && lines[lines.len() - 1].trim().starts_with(FENCE) {
        lines.len() - 1
    } else {
        lines.len()
    };

    lines[start..end].join("\n").trim().to_string()
}

/// Collects every closed fenced block in order of appearance.
fn code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        let stripped = line.trim();
        match current.take() {
            None => {
                if let Some(lang) = stripped.strip_prefix(FENCE) {
                    current = Some((lang.trim().to_string(), Vec::new()));
                }
            }
            Some((lang, body)) if stripped.starts_with(FENCE) => {
                blocks.push(CodeBlock {
                    lang,
                    body: body.join("\n"),
                });
            }
            Some((lang, mut body)) => {
                body.push(line);
                current = Some((lang, body));
            }
        }
    }

    blocks
}
