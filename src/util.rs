//! Utility functions shared by the fetcher and the EPUB writer.

#[cfg(feature = "http")]
use std::borrow::Cow;

/// Get a time-based seed value for pseudo-random number generation.
pub fn time_seed_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}

/// Generate a pseudo-random alphanumeric string.
///
/// Not cryptographically secure; long enough for ebook identifiers to be
/// practically unique.
pub fn random_alnum(len: usize) -> String {
    const ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut state = time_seed_nanos();
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ALNUM[((state >> 33) % ALNUM.len() as u64) as usize] as char
        })
        .collect()
}

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from a Content-Type charset)
/// 3. Falls back to Windows-1252 (common on old web pages)
#[cfg(feature = "http")]
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    // Windows-1252 is a superset of ISO-8859-1
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the charset parameter from a Content-Type header value.
///
/// ```ignore
/// assert_eq!(charset_from_content_type("text/html; charset=ISO-8859-1"), Some("ISO-8859-1"));
/// ```
#[cfg(feature = "http")]
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "http")]
    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("Kafka – Der Prozess".as_bytes(), None), "Kafka – Der Prozess");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_decode_with_hint() {
        // "für" in ISO-8859-1
        let bytes = b"f\xfcr";
        assert_eq!(decode_text(bytes, Some("iso-8859-1")), "für");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        let bytes = b"\x93quoted\x94";
        assert_eq!(decode_text(bytes, None), "\u{201c}quoted\u{201d}");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=ISO-8859-1"),
            Some("ISO-8859-1")
        );
        assert_eq!(
            charset_from_content_type("text/html;charset=\"utf-8\""),
            Some("utf-8")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn test_random_alnum() {
        let id = random_alnum(15);
        assert_eq!(id.len(), 15);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
