// src/services/moderation.rs
// DOCUMENTATION: Text cleanup and spam filtering for user content
// PURPOSE: Strip markup, enforce length bounds, reject spam replies

use crate::errors::HubError;
use regex::Regex;
use std::sync::OnceLock;

/// Longest run of one repeated character allowed in a reply
const MAX_CHAR_RUN: usize = 9;

struct SpamRule {
    pattern: Regex,
    reason: &'static str,
}

fn spam_rules() -> &'static [SpamRule] {
    static RULES: OnceLock<Vec<SpamRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?i)(https?://|www\.)\S+", "links are not allowed"),
            (
                r"(?i)\b(viagra|cialis|casino|lottery|bitcoin|crypto|forex|payday loan)\b",
                "spam keywords detected",
            ),
            (
                r"(?i)\b(buy now|click here|free money|limited offer|act now|dm me)\b",
                "promotional content is not allowed",
            ),
            (r"[!?$]{5,}", "excessive punctuation"),
        ]
        .into_iter()
        .map(|(pattern, reason)| SpamRule {
            pattern: Regex::new(pattern).expect("static spam pattern"),
            reason,
        })
        .collect()
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // An unclosed tag runs to the end of the input
    RE.get_or_init(|| Regex::new(r"<[a-zA-Z/!][^>]*(?:>|$)").expect("static tag pattern"))
}

/// Remove HTML tags and surrounding whitespace.
/// The result is plain text; it is not escaped for embedding in HTML.
pub fn strip_html(input: &str) -> String {
    tag_regex().replace_all(input, "").trim().to_string()
}

/// Strip markup, then require min..=max characters
pub fn clean_text(input: &str, field: &str, min: usize, max: usize) -> Result<String, HubError> {
    let cleaned = strip_html(input);
    let len = cleaned.chars().count();

    if len < min || len > max {
        return Err(HubError::ValidationError(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }

    Ok(cleaned)
}

/// Length of the longest run of one repeated non-whitespace character
fn longest_char_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<char> = None;

    for c in text.chars() {
        if Some(c) == previous && !c.is_whitespace() {
            current += 1;
        } else {
            current = 1;
        }
        previous = Some(c);
        longest = longest.max(current);
    }

    longest
}

/// Check reply text against the spam rules
pub fn check_spam(text: &str) -> Result<(), HubError> {
    if let Some(rule) = spam_rules().iter().find(|r| r.pattern.is_match(text)) {
        log::warn!("Spam filter matched: {}", rule.reason);
        return Err(HubError::SpamDetected(rule.reason.to_string()));
    }

    if longest_char_run(text) > MAX_CHAR_RUN {
        log::warn!("Spam filter matched: repeated characters");
        return Err(HubError::SpamDetected("too many repeated characters".to_string()));
    }

    Ok(())
}
