//! Input validation, sanitization and small text helpers for form fields.

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use url::Url;
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));
static SLUG_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("slug strip pattern compiles"));
static SLUG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_-]+").expect("slug separator pattern compiles"));
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("hashtag pattern compiles"));
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("mention pattern compiles"));

const PHONE_SEPARATORS: &[char] = &['+', '-', '.', '(', ')', ' '];
const MIN_PHONE_DIGITS: usize = 10;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_RE.is_match(email)
}

/// Digits plus `+ - . ( )` and spaces, with at least ten digits.
pub fn validate_phone_number(phone: &str) -> bool {
    let mut digits = 0;
    for c in phone.chars() {
        if c.is_ascii_digit() {
            digits += 1;
        } else if !PHONE_SEPARATORS.contains(&c) {
            return false;
        }
    }
    digits >= MIN_PHONE_DIGITS
}

/// Absolute URL check; relative references are rejected.
pub fn is_valid_url(raw: &str) -> bool {
    !raw.is_empty() && Url::parse(raw).is_ok()
}

/// Strips anything that looks like an HTML tag. Not an escaper: the result
/// must still be escaped before it is rendered as markup.
pub fn sanitize_input(input: &str) -> String {
    TAG_RE.replace_all(input, "").into_owned()
}

pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = SLUG_STRIP_RE.replace_all(lowered.trim(), "");
    let joined = SLUG_SEPARATOR_RE.replace_all(&stripped, "-");
    joined.trim_matches('-').to_string()
}

/// Random base-36 fragment followed by the base-36 millisecond timestamp.
/// Collisions are unlikely but possible; use [`generate_uuid`] where
/// uniqueness matters.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let fragment: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("{fragment}{}", to_base36(millis))
}

pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Keeps the first `length` characters and appends `...` when the text is
/// longer, so a truncated result is `length + 3` characters long.
pub fn truncate_text(text: &str, length: usize) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let head: String = text.chars().take(length).collect();
    format!("{head}...")
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}

pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

pub fn extract_mentions(text: &str) -> Vec<String> {
    MENTION_RE.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
