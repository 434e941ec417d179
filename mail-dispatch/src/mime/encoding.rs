use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Maximum encoded line length for base64 bodies (RFC 2045 §6.8)
pub const MAX_LINE_LEN: usize = 76;

/// Base64-encode `data` and hard-wrap it at 76 characters
///
/// Every line, including the last, is CRLF-terminated. Empty input yields an
/// empty string.
pub fn wrap_base64(data: &[u8]) -> String {
    let raw = BASE64.encode(data);
    let mut wrapped = String::with_capacity(raw.len() + (raw.len() / MAX_LINE_LEN + 1) * 2);

    // base64 output is ASCII, so byte chunks are valid UTF-8
    for chunk in raw.as_bytes().chunks(MAX_LINE_LEN) {
        wrapped.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        wrapped.push_str("\r\n");
    }

    wrapped
}

/// Make a value safe for a single header line
///
/// CR and LF would let a value start a new header, so they become spaces.
pub fn sanitize_header(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}

/// Encode a header value as an RFC 2047 encoded word when it is not plain ASCII
pub fn encode_header_value(value: &str) -> String {
    let value = sanitize_header(value);
    if value.is_ascii() {
        value
    } else {
        format!("=?utf-8?B?{}?=", BASE64.encode(value.as_bytes()))
    }
}

/// Escape a value for use inside a quoted-string parameter
pub fn quote_param(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in sanitize_header(value).chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted
}

/// Normalize every line ending in `text` to CRLF
pub fn normalize_line_endings(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                normalized.push_str("\r\n");
            }
            '\n' => normalized.push_str("\r\n"),
            _ => normalized.push(c),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_base64_encodes() {
        let encoded = wrap_base64(b"This is a test string to be encoded in base64.");
        assert!(encoded.starts_with("VGhpcy"));
        assert!(encoded.ends_with("\r\n"));
    }

    #[test]
    fn test_wrap_base64_line_lengths() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let encoded = wrap_base64(&data);

        let lines: Vec<&str> = encoded.split_terminator("\r\n").collect();
        assert!(lines.len() > 1);
        for line in &lines[..lines.len() - 1] {
            assert_eq!(line.len(), MAX_LINE_LEN);
        }
        assert!(lines.iter().all(|line| line.len() <= MAX_LINE_LEN));
    }

    #[test]
    fn test_wrap_base64_round_trip() {
        for len in [0usize, 1, 2, 3, 56, 57, 58, 113, 114, 1024] {
            let data: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
            let encoded = wrap_base64(&data);
            let joined: String = encoded.split("\r\n").collect();
            assert_eq!(BASE64.decode(joined).unwrap(), data, "length {}", len);
        }
    }

    #[test]
    fn test_wrap_base64_empty() {
        assert_eq!(wrap_base64(b""), "");
    }

    #[test]
    fn test_wrap_base64_exact_line() {
        // 57 bytes encode to exactly one 76-character line
        let encoded = wrap_base64(&[0u8; 57]);
        assert_eq!(encoded.len(), MAX_LINE_LEN + 2);
        assert_eq!(encoded.matches("\r\n").count(), 1);
    }

    #[test]
    fn test_sanitize_header() {
        assert_eq!(
            sanitize_header("Hi\r\nBcc: evil@x.com"),
            "Hi  Bcc: evil@x.com"
        );
    }

    #[test]
    fn test_encode_header_value() {
        assert_eq!(encode_header_value("Hello"), "Hello");
        assert_eq!(encode_header_value("Café"), "=?utf-8?B?Q2Fmw6k=?=");
    }

    #[test]
    fn test_quote_param() {
        assert_eq!(quote_param(r#"my "file".txt"#), r#"my \"file\".txt"#);
        assert_eq!(quote_param(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\nb\r\nc\rd"), "a\r\nb\r\nc\r\nd");
        assert_eq!(normalize_line_endings("hello"), "hello");
    }
}
