//! Signal codec — pulse buffers to and from compact text.
//!
//! # Format
//!
//! ```text
//! [100, 200, 300]  ──encode──►  "34_68_9c"
//!                  ◄──decode──
//! ```
//!
//! Each duration is rendered as an unsigned base-32 number (digits
//! `0-9a-v`) and the tokens are joined with `_`. Base 32 keeps typical
//! IR captures short enough for a 255-character text entity.
//!
//! `decode(encode(b)) == b` holds for every buffer.

use thiserror::Error;

/// Radix used for every token.
pub const SIGNAL_RADIX: u32 = 32;

/// Separator between encoded tokens.
pub const TOKEN_DELIMITER: char = '_';

/// Maximum encoded length accepted by the signal text entity.
pub const MAX_ENCODED_LEN: usize = 255;

const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// Longest rendering of a `u32` in base 32 (`"3vvvvvv"`).
const MAX_TOKEN_DIGITS: usize = 7;

/// Token-level decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Two delimiters in a row, or a leading/trailing delimiter.
    #[error("empty token at position {index}")]
    EmptyToken { index: usize },

    /// The token contains a character outside the base-32 alphabet.
    #[error("invalid token {token:?} at position {index}")]
    InvalidToken { index: usize, token: String },

    /// The token does not fit in a `u32`.
    #[error("token {token:?} at position {index} overflows u32")]
    Overflow { index: usize, token: String },
}

/// Encode a pulse buffer as delimited base-32 text.
///
/// Never fails. An empty buffer encodes to the empty string.
pub fn encode(pulses: &[u32]) -> String {
    let mut out = String::with_capacity(pulses.len() * 3);
    for (i, &pulse) in pulses.iter().enumerate() {
        if i > 0 {
            out.push(TOKEN_DELIMITER);
        }
        push_token(&mut out, pulse);
    }
    out
}

/// Decode delimited base-32 text back into a pulse buffer.
///
/// Surrounding whitespace is ignored and upper-case digits are
/// accepted. The empty string decodes to an empty buffer.
pub fn decode(text: &str) -> Result<Vec<u32>, CodecError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    text.split(TOKEN_DELIMITER)
        .enumerate()
        .map(|(index, token)| parse_token(index, token))
        .collect()
}

// ── Internal ─────────────────────────────────────────────────────

fn push_token(out: &mut String, mut value: u32) {
    let mut buf = [0u8; MAX_TOKEN_DIGITS];
    let mut pos = MAX_TOKEN_DIGITS;
    loop {
        pos -= 1;
        buf[pos] = DIGITS[(value % SIGNAL_RADIX) as usize];
        value /= SIGNAL_RADIX;
        if value == 0 {
            break;
        }
    }
    for &b in &buf[pos..] {
        out.push(b as char);
    }
}

fn parse_token(index: usize, token: &str) -> Result<u32, CodecError> {
    if token.is_empty() {
        return Err(CodecError::EmptyToken { index });
    }

    let mut value: u32 = 0;
    for c in token.chars() {
        let digit = c.to_digit(SIGNAL_RADIX).ok_or_else(|| CodecError::InvalidToken {
            index,
            token: token.to_string(),
        })?;
        value = value
            .checked_mul(SIGNAL_RADIX)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| CodecError::Overflow {
                index,
                token: token.to_string(),
            })?;
    }
    Ok(value)
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_known_values() {
        assert_eq!(encode(&[100, 200, 300]), "34_68_9c");
        assert_eq!(encode(&[0]), "0");
        assert_eq!(encode(&[31, 32]), "v_10");
        assert_eq!(encode(&[u32::MAX]), "3vvvvvv");
    }

    #[test]
    fn encode_empty_buffer() {
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn encode_produces_one_token_per_value() {
        let pulses = [9000, 4500, 560, 560, 560, 1690, 0, 1];
        let encoded = encode(&pulses);
        assert_eq!(encoded.split(TOKEN_DELIMITER).count(), pulses.len());
        assert!(!encoded.starts_with(TOKEN_DELIMITER));
        assert!(!encoded.ends_with(TOKEN_DELIMITER));
    }

    #[test]
    fn decode_keeps_every_token() {
        assert_eq!(decode("34_68_9c").unwrap(), vec![100, 200, 300]);
        assert_eq!(decode("0").unwrap(), vec![0]);
    }

    #[test]
    fn decode_empty_and_whitespace() {
        assert_eq!(decode("").unwrap(), Vec::<u32>::new());
        assert_eq!(decode("  34_68\n").unwrap(), vec![100, 200]);
    }

    #[test]
    fn decode_accepts_uppercase() {
        assert_eq!(decode("9C_3VVVVVV").unwrap(), vec![300, u32::MAX]);
    }

    #[test]
    fn decode_rejects_out_of_alphabet() {
        let err = decode("34_w8_9c").unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidToken {
                index: 1,
                token: "w8".into()
            }
        );
    }

    #[test]
    fn decode_rejects_signs() {
        assert!(matches!(
            decode("+34"),
            Err(CodecError::InvalidToken { index: 0, .. })
        ));
        assert!(matches!(
            decode("34_-1"),
            Err(CodecError::InvalidToken { index: 1, .. })
        ));
    }

    #[test]
    fn decode_rejects_empty_tokens() {
        assert_eq!(decode("34__9c"), Err(CodecError::EmptyToken { index: 1 }));
        assert_eq!(decode("34_"), Err(CodecError::EmptyToken { index: 1 }));
        assert_eq!(decode("_34"), Err(CodecError::EmptyToken { index: 0 }));
    }

    #[test]
    fn decode_rejects_overflow() {
        // 4000000 in base 32 is 2^32.
        assert!(matches!(
            decode("4000000"),
            Err(CodecError::Overflow { index: 0, .. })
        ));
    }

    #[test]
    fn roundtrip_boundaries() {
        let pulses = vec![0, 1, 31, 32, 1023, 1024, u32::MAX - 1, u32::MAX];
        assert_eq!(decode(&encode(&pulses)).unwrap(), pulses);
    }

    #[test]
    fn roundtrip_every_power_of_two() {
        let pulses: Vec<u32> = (0..32).map(|shift| 1u32 << shift).collect();
        assert_eq!(decode(&encode(&pulses)).unwrap(), pulses);
    }
}
