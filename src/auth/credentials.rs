//! Basic-auth credential codec.
//!
//! Decodes the value of an `Authorization: Basic <payload>` header down to an
//! `email:password` pair. Every malformed input reads as "no credentials";
//! nothing in this module errors or panics on client data.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Return the base64 payload after the literal `"Basic "` prefix, trimmed of
/// surrounding whitespace.
pub fn strip_basic_prefix(header: &str) -> Option<&str> {
    header.strip_prefix("Basic ").map(str::trim)
}

/// Decode a base64 payload into UTF-8 text.
///
/// Invalid base64 and invalid UTF-8 both yield `None`.
pub fn decode(token: &str) -> Option<String> {
    let bytes = STANDARD.decode(token.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Split decoded credentials on the first `:` only; the password may itself
/// contain colons.
pub fn split_credentials(decoded: &str) -> Option<(&str, &str)> {
    decoded.split_once(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_accepts_basic() {
        assert_eq!(strip_basic_prefix("Basic dXNlcjpwYXNz"), Some("dXNlcjpwYXNz"));
        assert_eq!(strip_basic_prefix("Basic  dXNlcjpwYXNz "), Some("dXNlcjpwYXNz"));
    }

    #[test]
    fn strip_prefix_rejects_other_schemes() {
        assert_eq!(strip_basic_prefix(""), None);
        assert_eq!(strip_basic_prefix("Bearer abc"), None);
        assert_eq!(strip_basic_prefix("basic dXNlcjpwYXNz"), None);
        assert_eq!(strip_basic_prefix("Basic"), None);
    }

    #[test]
    fn decode_valid_payload() {
        let encoded = STANDARD.encode("alice@example.com:secret");
        assert_eq!(
            decode(&encoded).as_deref(),
            Some("alice@example.com:secret")
        );
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        assert_eq!(decode("not base64!!!"), None);
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let encoded = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert_eq!(decode(&encoded), None);
    }

    #[test]
    fn split_on_first_colon_only() {
        assert_eq!(
            split_credentials("alice@example.com:pass:with:colons"),
            Some(("alice@example.com", "pass:with:colons"))
        );
        assert_eq!(split_credentials("alice@example.com:"), Some(("alice@example.com", "")));
    }

    #[test]
    fn split_requires_separator() {
        assert_eq!(split_credentials("no-separator"), None);
        assert_eq!(split_credentials(""), None);
    }
}
