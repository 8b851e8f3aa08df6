//! Input rules for feedback submissions and replies.
//!
//! Lengths are counted in characters, not bytes.

pub const MAX_CONTENT_CHARS: usize = 1000;
pub const MAX_USERNAME_CHARS: usize = 30;
pub const MAX_CONTEXT_CHARS: usize = 200;
pub const MAX_REPLY_CHARS: usize = 500;
/// Content with a single character repeated this many times in a row is
/// rejected as spam.
pub const MAX_REPEAT_RUN: usize = 11;

pub const DEFAULT_USERNAME: &str = "Anonymous";

/// Trims `content` and checks it against the submission rules.
pub fn validate_content(content: &str) -> Result<String, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("content cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_CONTENT_CHARS {
        return Err(format!(
            "content too long (max {} characters)",
            MAX_CONTENT_CHARS
        ));
    }
    if has_repeated_run(trimmed, MAX_REPEAT_RUN) {
        return Err("invalid content".to_string());
    }
    Ok(trimmed.to_string())
}

/// True if some character occurs at least `run` times consecutively.
pub fn has_repeated_run(text: &str, run: usize) -> bool {
    let mut prev = None;
    let mut count = 0;
    for c in text.chars() {
        if prev == Some(c) {
            count += 1;
        } else {
            prev = Some(c);
            count = 1;
        }
        if count >= run {
            return true;
        }
    }
    false
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub fn normalize_username(username: Option<&str>) -> String {
    match username {
        Some(name) if !name.is_empty() => truncate_chars(name, MAX_USERNAME_CHARS),
        _ => DEFAULT_USERNAME.to_string(),
    }
}

/// Trimmed and truncated reply; `None` clears it.
pub fn normalize_reply(reply: Option<&str>) -> Option<String> {
    let trimmed = reply?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(truncate_chars(trimmed, MAX_REPLY_CHARS))
    }
}
