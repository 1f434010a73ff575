//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Persona and output rules shared by every call
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// Opening question for the unsure path
pub const OPENING: &str = include_str!("../../prompts/opening.pmt");

/// Next question given the conversation so far
pub const FOLLOW_UP: &str = include_str!("../../prompts/follow-up.pmt");

/// Final reframing of a finished reflection
pub const MENTORSHIP: &str = include_str!("../../prompts/mentorship.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "system" => Some(SYSTEM),
        "opening" => Some(OPENING),
        "follow-up" => Some(FOLLOW_UP),
        "mentorship" => Some(MENTORSHIP),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_known() {
        for name in ["system", "opening", "follow-up", "mentorship"] {
            assert!(get_embedded(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn test_question_prompts_ask_for_both_languages() {
        for prompt in [OPENING, FOLLOW_UP] {
            assert!(prompt.contains("question_en"));
            assert!(prompt.contains("question_ja"));
        }
    }

    #[test]
    fn test_mentorship_prompt_lists_keys() {
        for key in ["secondary", "primary", "bridgeText_en", "grounding_ja", "summary_en"] {
            assert!(MENTORSHIP.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
