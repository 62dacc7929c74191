//! String helpers for terminal output

/// Pluralize a word based on count
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Shorten `text` to at most `max` characters by replacing its middle with
/// `…`, keeping both ends of long paths readable
pub fn truncate_middle(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max || max < 3 {
        return text.to_string();
    }

    let keep = max - 1;
    let head = keep / 2;
    let tail = keep - head;

    let start: String = text.chars().take(head).collect();
    let end: String = text.chars().skip(len - tail).collect();
    format!("{start}…{end}")
}
