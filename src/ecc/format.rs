//! Rendering and parsing of data words and codewords.
//!
//! Words are typed either as hex with a `0x` prefix or as binary. Binary input
//! keeps only its `0` and `1` characters, so grouped input such as
//! `1010 0001` or `1010_0001` is accepted as is. Any other digit is an error:
//! `12` is a mistyped decimal, not the binary word `1`.

use crate::ecc::hamming::HammingCodec;
use crate::ecc::Result;
use crate::error::Error;

/// Zero-padded binary, most significant bit first.
pub fn to_bit_string(value: u64, width: usize) -> String {
    format!("{:0width$b}", value, width = width)
}

/// `0x`-prefixed lowercase hex.
pub fn to_hex(value: u64) -> String {
    format!("{:#x}", value)
}

/// Parses a word typed as `0x...` hex or as binary digits.
pub fn parse_word(text: &str) -> Result<u64> {
    let text = text.trim();

    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        let digits: String = digits.chars().filter(|&c| c != '_').collect();
        if digits.is_empty() {
            return Err(Error::InvalidInput(format!("empty hex word: {:?}", text)));
        }
        return u64::from_str_radix(&digits, 16)
            .map_err(|e| Error::InvalidInput(format!("invalid hex word {:?}: {}", text, e)));
    }

    if let Some(digit) = text.chars().find(|c| matches!(c, '2'..='9')) {
        return Err(Error::InvalidInput(format!(
            "invalid binary word {:?}: digit {} is not binary, use 0x for hex",
            text, digit
        )));
    }

    let digits: String = text.chars().filter(|&c| c == '0' || c == '1').collect();
    if digits.is_empty() {
        return Err(Error::InvalidInput(format!(
            "invalid binary word: {:?}",
            text
        )));
    }
    u64::from_str_radix(&digits, 2)
        .map_err(|e| Error::InvalidInput(format!("invalid binary word {:?}: {}", text, e)))
}

/// A value cut down to a data width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fitted {
    pub value: u64,
    /// Whether any bits above the width were dropped.
    pub truncated: bool,
}

/// Drops the most significant bits of `value` that do not fit in `data_bits`.
pub fn fit_to_width(value: u64, data_bits: usize) -> Fitted {
    if data_bits >= u64::BITS as usize {
        return Fitted {
            value,
            truncated: false,
        };
    }

    let masked = value & ((1u64 << data_bits) - 1);
    Fitted {
        value: masked,
        truncated: masked != value,
    }
}

/// Renders a codeword as bit labels over bit values, most significant first.
///
/// When `highlight` names a bit of the codeword, a third line marks it with `^`.
pub fn render_codeword(codec: &HammingCodec, word: u64, highlight: Option<usize>) -> String {
    let mut labels = Vec::with_capacity(codec.total_bits());
    let mut bits = Vec::with_capacity(codec.total_bits());
    let mut marks = Vec::with_capacity(codec.total_bits());

    for position in (0..codec.total_bits()).rev() {
        let label = codec
            .bit_kind(position)
            .map(|kind| kind.label())
            .unwrap_or_default();
        labels.push(format!("{:>3}", label));
        bits.push(format!("{:>3}", word >> position & 1));
        marks.push(if highlight == Some(position) { "  ^" } else { "   " });
    }

    let mut out = format!("{}\n{}", labels.join(" "), bits.join(" "));
    if highlight.is_some_and(|position| position < codec.total_bits()) {
        out.push('\n');
        out.push_str(marks.join(" ").trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_string_padding() {
        assert_eq!(to_bit_string(0b101, 8), "00000101");
        assert_eq!(to_bit_string(0, 4), "0000");
        assert_eq!(to_bit_string(0b1_0000, 3), "10000");
    }

    #[test]
    fn test_hex() {
        assert_eq!(to_hex(0x1A), "0x1a");
        assert_eq!(to_hex(0), "0x0");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_word("0x1A"), Ok(0x1A));
        assert_eq!(parse_word("  0XbeEF "), Ok(0xBEEF));
        assert_eq!(parse_word("0xdead_beef"), Ok(0xDEAD_BEEF));
        assert!(parse_word("0x").is_err());
        assert!(parse_word("0xZZ").is_err());
        assert!(parse_word("0x1_0000_0000_0000_0000").is_err());
    }

    #[test]
    fn test_parse_binary() {
        assert_eq!(parse_word("1010"), Ok(0b1010));
        assert_eq!(parse_word("1010 0001"), Ok(0b1010_0001));
        assert_eq!(parse_word("1010_0001"), Ok(0b1010_0001));
        assert_eq!(parse_word("0"), Ok(0));
        assert!(parse_word("").is_err());
        assert!(parse_word("xyz").is_err());
        assert!(parse_word(&"1".repeat(65)).is_err());
    }

    #[test]
    fn test_parse_rejects_non_binary_digits() {
        assert!(parse_word("12").is_err());
        assert!(parse_word("1021").is_err());
        assert!(parse_word("1010 9").is_err());
        assert_eq!(parse_word("1010 0001"), Ok(0b1010_0001));
        assert_eq!(parse_word("0x12"), Ok(0x12));
    }

    #[test]
    fn test_fit_to_width() {
        assert_eq!(
            fit_to_width(0x1FF, 8),
            Fitted {
                value: 0xFF,
                truncated: true
            }
        );
        assert_eq!(
            fit_to_width(0xFF, 8),
            Fitted {
                value: 0xFF,
                truncated: false
            }
        );
        assert_eq!(fit_to_width(0x1_0000, 16).value, 0);
        assert!(!fit_to_width(u64::MAX, 64).truncated);
    }

    #[test]
    fn test_render_codeword() {
        let codec = HammingCodec::new(8).unwrap();
        let encoded = codec.encode(0b1011_0001).unwrap();
        let rendered = render_codeword(&codec, encoded, None);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("PG"));
        assert!(lines[0].trim_end().ends_with("P0"));
        let bits: String = lines[1].split_whitespace().collect();
        assert_eq!(bits, to_bit_string(encoded, codec.total_bits()));
    }

    #[test]
    fn test_render_highlight() {
        let codec = HammingCodec::new(8).unwrap();
        let rendered = render_codeword(&codec, 0, Some(0));
        let marker = rendered.lines().nth(2).unwrap();
        // Position 0 is the last column
        assert!(marker.ends_with('^'));
        assert_eq!(marker.matches('^').count(), 1);

        let rendered = render_codeword(&codec, 0, Some(13));
        assert_eq!(rendered.lines().count(), 2);
    }
}
