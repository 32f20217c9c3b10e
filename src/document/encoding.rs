use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use lazy_static::lazy_static;
use regex::bytes::Regex;

lazy_static! {
    /// `encoding="..."` inside a leading XML declaration
    static ref DECLARED_ENCODING: Regex =
        Regex::new(r#"^<\?xml\s[^>]*?encoding\s*=\s*["']([A-Za-z][A-Za-z0-9._\-]*)["']"#)
            .expect("encoding declaration regex is valid");
}

/// Encoding of a raw XML document and the length of its byte-order mark
///
/// A BOM wins, then UTF-16 sniffed from `<?` without a BOM, then the
/// declared encoding. Anything else is UTF-8.
pub fn detect(bytes: &[u8]) -> (&'static Encoding, usize) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, bom_len);
    }

    if bytes.starts_with(&[b'<', 0, b'?', 0]) {
        return (UTF_16LE, 0);
    }
    if bytes.starts_with(&[0, b'<', 0, b'?']) {
        return (UTF_16BE, 0);
    }

    // A declaration readable as ASCII cannot truthfully name a UTF-16 family encoding
    let declared = DECLARED_ENCODING
        .captures(bytes)
        .and_then(|caps| Encoding::for_label(&caps[1]))
        .filter(|encoding| encoding.is_ascii_compatible());

    (declared.unwrap_or(UTF_8), 0)
}

/// Decode a raw document to text, or name the encoding it is not valid in
pub fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, &'static Encoding> {
    let (encoding, bom_len) = detect(bytes);
    tracing::trace!("Decoding document as {}", encoding.name());

    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or(encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    fn utf16le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_detection_order() {
        assert_eq!(detect(b"<Test/>"), (UTF_8, 0));
        assert_eq!(detect(b"\xEF\xBB\xBF<Test/>"), (UTF_8, 3));
        assert_eq!(detect(b"\xFF\xFE<\x00"), (UTF_16LE, 2));
        assert_eq!(detect(&utf16le("<?xml version=\"1.0\"?>")), (UTF_16LE, 0));
        assert_eq!(detect(b"\x00<\x00?\x00x"), (UTF_16BE, 0));

        // ISO-8859-1 is an alias of windows-1252 in encoding_rs
        let latin1 = br#"<?xml version="1.0" encoding='ISO-8859-1'?><Test/>"#;
        assert_eq!(detect(latin1), (WINDOWS_1252, 0));
    }

    #[test]
    fn test_unknown_or_contradictory_declarations_fall_back_to_utf8() {
        assert_eq!(detect(br#"<?xml version="1.0" encoding="no-such-charset"?><a/>"#).0, UTF_8);
        assert_eq!(detect(br#"<?xml version="1.0" encoding="UTF-16"?><a/>"#).0, UTF_8);
        // Only a leading declaration counts
        assert_eq!(detect(br#"<a><?xml version="1.0" encoding="ISO-8859-1"?></a>"#).0, UTF_8);
    }

    #[test]
    fn test_decode() {
        let latin1 = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><Test>caf\xE9</Test>";
        assert!(decode(latin1).unwrap().ends_with("<Test>café</Test>"));

        let mut utf16 = vec![0xFF, 0xFE];
        utf16.extend(utf16le("<Test>café</Test>"));
        assert_eq!(decode(&utf16).unwrap(), "<Test>café</Test>");

        assert_eq!(decode(b"<Test>\xFF</Test>").unwrap_err(), UTF_8);
    }
}
