//! Response parsing for LLM outputs.
//!
//! Models often wrap the snippet in a markdown code block even when told not
//! to. The fence markers are removed so the remaining text can be parsed.

use regex::Regex;
use std::sync::OnceLock;

/// Opening marker at the start of a line, with an optional language tag.
fn opening_fence() -> &'static Regex {
    static OPENING: OnceLock<Regex> = OnceLock::new();
    OPENING.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*```[a-z0-9_+-]*[ \t]*").expect("opening fence pattern is valid")
    })
}

/// Closing marker at the end of a line, possibly sharing it with code.
fn closing_fence() -> &'static Regex {
    static CLOSING: OnceLock<Regex> = OnceLock::new();
    CLOSING.get_or_init(|| {
        Regex::new(r"(?im)[ \t]*```[ \t]*$").expect("closing fence pattern is valid")
    })
}

/// Strips code-fence markers (```` ``` ````, ```` ```json ````, ...) and trims.
///
/// Markers are removed at line starts and line ends, so a closing fence on the
/// same line as the code is handled. Backticks inside a line are kept.
pub fn strip_code_fences(response: &str) -> String {
    let opened = opening_fence().replace_all(response, "");
    closing_fence().replace_all(&opened, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_json_fence() {
        let response = "```json\n{\"statements\": []}\n```";
        assert_eq!(strip_code_fences(response), "{\"statements\": []}");
    }

    #[test]
    fn test_strip_bare_fence() {
        let response = "```\n{\"statements\": []}\n```\n";
        assert_eq!(strip_code_fences(response), "{\"statements\": []}");
    }

    #[test]
    fn test_fence_language_is_case_insensitive() {
        let response = "  ```JSON  \n{}\n  ```";
        assert_eq!(strip_code_fences(response), "{}");
    }

    #[test]
    fn test_no_fence() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  \n"), "{\"a\": 1}");
    }

    #[test]
    fn test_multiline_body_is_kept() {
        let response = "```json\n{\n  \"statements\": [\n  ]\n}\n```";
        assert_eq!(strip_code_fences(response), "{\n  \"statements\": [\n  ]\n}");
    }

    #[test]
    fn test_inline_backticks_are_kept() {
        let response = "{\"value\": \"```\"}";
        assert_eq!(strip_code_fences(response), response);
    }

    #[test]
    fn test_closing_fence_on_code_line() {
        let response = "```json\n{\"statements\": []}```";
        assert_eq!(strip_code_fences(response), "{\"statements\": []}");
    }

    #[test]
    fn test_fenced_plan_on_one_line() {
        let response = "```json {\"statements\": []} ```";
        assert_eq!(strip_code_fences(response), "{\"statements\": []}");
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(strip_code_fences(""), "");
    }
}
