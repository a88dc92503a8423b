//! Text chunking for sequential speech playback
//!
//! Long messages are cut at sentence boundaries so the speech bridge
//! never receives more than it can comfortably play in one go.

/// Separator used both to rejoin sentences and to seal a chunk
const SENTENCE_JOIN: &str = ". ";

/// Split `text` into chunks of at most `max_len` characters
///
/// `.`, `?` and `!` all count as sentence ends and come back out as `.`.
/// A sentence that alone is longer than `max_len` is emitted whole.
/// Blank input yields no chunks.
pub fn chunk(text: &str, max_len: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for sentence in sentences(text) {
        current.push(sentence);
        // sealed length, trailing period included
        let candidate = char_len(&current.join(SENTENCE_JOIN)) + 1;
        if candidate > max_len && current.len() > 1 {
            current.pop();
            chunks.push(seal(&current));
            current.clear();
            current.push(sentence);
        }
    }

    if !current.is_empty() {
        chunks.push(seal(&current));
    }

    chunks
}

/// Non-empty, trimmed sentences of `text` in order
pub fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '?', '!'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn seal(sentences: &[&str]) -> String {
    format!("{}.", sentences.join(SENTENCE_JOIN))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
