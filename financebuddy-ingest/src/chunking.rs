//! Whitespace normalization and boundary-aware chunking (spec §4.3 a/b).

/// Configuration for the chunking step.
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    /// Target chunk size, in characters.
    pub target_size: usize,
    /// Overlap between consecutive chunks, in characters.
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            target_size: 800,
            overlap: 150,
        }
    }
}

/// Collapse runs of whitespace to single spaces, and runs of 3+ newlines
/// to a paragraph break, trimming the result. Paragraph breaks are
/// preserved (as `"\n\n"`) since the chunker uses them as preferred split
/// points.
#[must_use]
pub fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut newline_run = 0usize;

    while let Some(c) = chars.next() {
        if c == '\n' {
            newline_run += 1;
            continue;
        }
        if newline_run > 0 {
            out.push_str(if newline_run >= 2 { "\n\n" } else { " " });
            newline_run = 0;
        }
        if c.is_whitespace() {
            if !out.ends_with(' ') && !out.ends_with('\n') {
                out.push(' ');
            }
            while chars.peek().is_some_and(|n| n.is_whitespace() && *n != '\n') {
                chars.next();
            }
        } else {
            out.push(c);
        }
    }
    if newline_run >= 2 {
        out.push_str("\n\n");
    }
    out.trim().to_string()
}

/// Split `text` into overlapping chunks of approximately `config.target_size`
/// characters, preferring to break on a paragraph boundary, falling back to
/// a sentence boundary, and finally a word boundary — never splitting a
/// word in half.
#[must_use]
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= config.target_size {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < len {
        let ideal_end = (start + config.target_size).min(len);
        let end = if ideal_end >= len {
            len
        } else {
            find_break_point(&chars, start, ideal_end)
        };

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end >= len {
            break;
        }
        // Advance by target_size minus overlap, but always make forward progress.
        let advance = config.target_size.saturating_sub(config.overlap).max(1);
        let next_start = start + advance;
        start = next_start.max(start + 1).min(end);
        if start >= end {
            start = end;
        }
    }
    chunks
}

/// Find the best break point at or before `max_pos`, preferring a
/// paragraph break, then a sentence end, then the nearest preceding word
/// boundary, so a chunk never ends mid-word.
fn find_break_point(chars: &[char], start: usize, max_pos: usize) -> usize {
    // Paragraph boundary: two consecutive newlines.
    for i in (start + 1..max_pos).rev() {
        if chars[i] == '\n' && i > 0 && chars[i - 1] == '\n' {
            return i + 1;
        }
    }
    // Sentence boundary: '.', '!', '?' followed by whitespace.
    for i in (start + 1..max_pos).rev() {
        if matches!(chars[i], '.' | '!' | '?')
            && chars.get(i + 1).is_some_and(|c| c.is_whitespace())
        {
            return i + 1;
        }
    }
    // Word boundary: nearest preceding whitespace.
    for i in (start + 1..max_pos).rev() {
        if chars[i].is_whitespace() {
            return i;
        }
    }
    max_pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_runs_of_whitespace() {
        let out = normalize_whitespace("Hello   world\t\tagain");
        assert_eq!(out, "Hello world again");
    }

    #[test]
    fn normalize_preserves_paragraph_breaks() {
        let out = normalize_whitespace("Para one.\n\n\nPara two.");
        assert_eq!(out, "Para one.\n\nPara two.");
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("short text", &ChunkConfig::default());
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn long_text_is_split_without_breaking_words() {
        let sentence = "Options are derivative contracts that convey rights. ";
        let text: String = sentence.repeat(60);
        let chunks = chunk_text(&text, &ChunkConfig::default());
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
            // No chunk should start or end mid-word (first/last char isn't
            // a lowercase continuation of a split token).
            assert!(!chunk.starts_with(|c: char| c.is_alphanumeric())
                || text.contains(chunk.split_whitespace().next().unwrap()));
        }
    }

    #[test]
    fn chunks_overlap_by_roughly_the_configured_amount() {
        let text = "word ".repeat(400);
        let cfg = ChunkConfig {
            target_size: 200,
            overlap: 50,
        };
        let chunks = chunk_text(&text, &cfg);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", &ChunkConfig::default()).is_empty());
    }
}
