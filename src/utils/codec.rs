//! Base62 short-code codec.
//!
//! Converts reserved counter values into the public short-code alphabet and
//! back. Encoding is a plain radix conversion emitting the least significant
//! digit first, with no padding, so codes stay as short as the value allows.

/// The public code alphabet.
///
/// Only the first 62 symbols are ever produced by [`encode`] (the radix is
/// 62), but [`decode`] accepts all 64 so that historically issued codes
/// containing `+` or `/` keep resolving.
const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const RADIX: u64 = 62;

/// Errors that can occur while decoding a short code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid character {0:?} in short code")]
    InvalidCharacter(char),
}

/// Encodes a counter value into a short code.
///
/// Digits are emitted least-significant first. `encode(0)` produces an empty
/// string; the key generation counter starts at 1, so the zero case is never
/// handed out as a code.
pub fn encode(mut id: u64) -> String {
    let mut code = String::new();

    while id > 0 {
        let remainder = (id % RADIX) as usize;
        code.push(ALPHABET[remainder] as char);
        id /= RADIX;
    }

    code
}

/// Decodes a short code back into its counter value.
///
/// Exact inverse of [`encode`]: `decode(&encode(n)) == Ok(n)` for every
/// `n >= 1`.
///
/// # Errors
///
/// Returns [`CodecError::InvalidCharacter`] for any character outside the
/// 64-symbol alphabet. This is distinct from "code not found": a decodable
/// code may still have no link behind it.
pub fn decode(code: &str) -> Result<u64, CodecError> {
    let mut id: u64 = 0;
    let mut place: u64 = 1;

    for c in code.chars() {
        let digit = ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(CodecError::InvalidCharacter(c))? as u64;

        id += digit * place;
        place *= RADIX;
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_small_values() {
        assert_eq!(encode(1), "B");
        assert_eq!(encode(61), "9");
        assert_eq!(encode(62), "AB");
        assert_eq!(encode(63), "BB");
    }

    #[test]
    fn test_encode_zero_is_empty() {
        // Degenerate case; the counter starts at 1 so this never ships.
        assert_eq!(encode(0), "");
    }

    #[test]
    fn test_round_trip() {
        for n in [1u64, 7, 61, 62, 63, 1000, 123_456_789, u32::MAX as u64] {
            assert_eq!(decode(&encode(n)), Ok(n), "round trip failed for {}", n);
        }
    }

    #[test]
    fn test_round_trip_dense_range() {
        for n in 1..5_000u64 {
            assert_eq!(decode(&encode(n)), Ok(n));
        }
    }

    #[test]
    fn test_decode_accepts_full_alphabet() {
        // '+' and '/' are valid on decode even though encode never emits them.
        assert_eq!(decode("+"), Ok(62));
        assert_eq!(decode("/"), Ok(63));
    }

    #[test]
    fn test_decode_rejects_foreign_characters() {
        assert_eq!(decode("ab-c"), Err(CodecError::InvalidCharacter('-')));
        assert_eq!(decode("abc!"), Err(CodecError::InvalidCharacter('!')));
        assert_eq!(decode("äbc"), Err(CodecError::InvalidCharacter('ä')));
    }

    #[test]
    fn test_codes_are_unique_within_batch() {
        use std::collections::HashSet;

        let codes: HashSet<String> = (1..10_000u64).map(encode).collect();
        assert_eq!(codes.len(), 9_999);
    }
}
