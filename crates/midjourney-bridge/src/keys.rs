//! Normalized filesystem keys for staged artifacts
//!
//! The remote service decorates attachment filenames with a
//! segment-delimited prefix (the invoking username) and suffix (a job id):
//! `username_the_prompt_words_jobid.png`. The normalized key strips that
//! decoration and bounds the length so filesystem keys stay predictable,
//! and is the same key the coordinator derives from the prompt itself.

/// Maximum length of the key stem, in characters.
pub const MAX_KEY_LEN: usize = 20;
/// All staged artifacts carry this extension.
pub const STAGED_EXTENSION: &str = ".jpg";
/// Prefix marking an upscaled (already final, untiled) artifact.
pub const UPSCALE_PREFIX: &str = "UPSCALED_";

/// Key the coordinator expects for a fresh result of `prompt`:
/// spaces become underscores, truncated to [`MAX_KEY_LEN`] characters.
pub fn prompt_key(prompt: &str) -> String {
    let stem = prompt.replace(' ', "_");
    format!("{}{}", truncate_chars(&stem, MAX_KEY_LEN), STAGED_EXTENSION)
}

/// Normalize a raw attachment filename into a staged-artifact key.
///
/// - The extension is dropped; staged artifacts are always `.jpg`.
/// - A stem with three or more `_`-separated segments loses its first and
///   last segment (the remote decoration). With fewer segments, or when
///   stripping would leave nothing (empty inner segments), the whole stem
///   is kept — a filename without the expected decoration maps to itself
///   rather than to an empty key.
/// - The stem is truncated to [`MAX_KEY_LEN`] characters.
/// - Upscale variants are prefixed with `UPSCALED_` unless already present.
pub fn normalize_key(raw_filename: &str, is_upscale: bool) -> String {
    let stem = match raw_filename.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => raw_filename,
    };

    let segments: Vec<&str> = stem.split('_').collect();
    let inner = if segments.len() >= 3 {
        segments[1..segments.len() - 1].join("_")
    } else {
        stem.to_string()
    };
    let inner = if inner.is_empty() { stem.to_string() } else { inner };

    let mut key = truncate_chars(&inner, MAX_KEY_LEN).to_string();
    if is_upscale && !key.starts_with(UPSCALE_PREFIX) {
        key.insert_str(0, UPSCALE_PREFIX);
    }
    key.push_str(STAGED_EXTENSION);
    key
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
