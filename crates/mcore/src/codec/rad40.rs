// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RAD40 (radix-50) packed text.
//!
//! Three characters of the 40-character alphabet pack into one 16-bit
//! little-endian word: `((c0 * 40) + c1) * 40 + c2`. An odd trailing byte
//! is truncated rather than reported, matching the wire behavior of the
//! table formats that carry RAD40 names.

use crate::error::{MError, MErrorCode, MResult};

const ALPHABET: &[u8; 40] = b" ABCDEFGHIJKLMNOPQRSTUVWXYZ$.%0123456789";

fn char_to_code(c: char) -> MResult<u16> {
    let upper = c.to_ascii_uppercase();
    ALPHABET
        .iter()
        .position(|&a| a as char == upper)
        .map(|i| i as u16)
        .ok_or_else(|| {
            MError::software(
                MErrorCode::UnexpectedCharacter,
                format!("Character '{}' has no RAD40 representation", c.escape_default()),
            )
        })
}

/// Unpack a RAD40 buffer into text.
pub fn from_rad40(data: &[u8]) -> MResult<String> {
    let mut out = String::with_capacity(data.len() / 2 * 3);
    for pair in data.chunks_exact(2) {
        let mut word = u16::from_le_bytes([pair[0], pair[1]]);
        if word >= 40 * 40 * 40 {
            return Err(MError::software(
                MErrorCode::BadConversion,
                format!("Word 0x{:04X} is not a valid RAD40 triple", word),
            ));
        }
        let c2 = word % 40;
        word /= 40;
        let c1 = word % 40;
        let c0 = word / 40;
        out.push(ALPHABET[c0 as usize] as char);
        out.push(ALPHABET[c1 as usize] as char);
        out.push(ALPHABET[c2 as usize] as char);
    }
    Ok(out)
}

/// Pack text into a RAD40 buffer of `rad_size` bytes, space-padding
/// short input. An odd byte size loses its trailing byte.
pub fn to_rad40(text: &str, rad_size: usize) -> MResult<Vec<u8>> {
    let words = rad_size / 2;
    let chars: Vec<char> = text.chars().collect();
    if chars.len() > words * 3 {
        return Err(MError::software(
            MErrorCode::StringTooLong,
            format!(
                "String of {} characters is too long to fit within {} characters",
                chars.len(),
                words * 3
            ),
        ));
    }
    let mut out = Vec::with_capacity(words * 2);
    for w in 0..words {
        let mut word: u16 = 0;
        for i in 0..3 {
            let code = match chars.get(w * 3 + i) {
                Some(&c) => char_to_code(c)?,
                None => 0, // space padding
            };
            word = word * 40 + code;
        }
        out.extend_from_slice(&word.to_le_bytes());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let packed = to_rad40("KWH", 2).unwrap();
        assert_eq!(from_rad40(&packed).unwrap(), "KWH");

        let packed = to_rad40("DEMAND", 4).unwrap();
        assert_eq!(from_rad40(&packed).unwrap(), "DEMAND");
    }

    #[test]
    fn test_padding_and_case() {
        let packed = to_rad40("ab", 2).unwrap();
        assert_eq!(from_rad40(&packed).unwrap(), "AB ");
    }

    #[test]
    fn test_digits_and_marks() {
        let packed = to_rad40("A1$", 2).unwrap();
        assert_eq!(from_rad40(&packed).unwrap(), "A1$");
    }

    #[test]
    fn test_bad_character_reported() {
        let err = to_rad40("A#B", 2).unwrap_err();
        assert_eq!(err.code(), MErrorCode::UnexpectedCharacter);
    }

    #[test]
    fn test_too_long_reported() {
        let err = to_rad40("ABCD", 2).unwrap_err();
        assert_eq!(err.code(), MErrorCode::StringTooLong);
    }

    #[test]
    fn test_odd_byte_truncated() {
        assert_eq!(from_rad40(&[0x00]).unwrap(), "");
        let packed = to_rad40("AB", 3).unwrap();
        assert_eq!(packed.len(), 2);
    }
}
