// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-string text codecs: hex with formatting templates, numeric byte
//! strings, UINT/INT field marshalling, and Base64.

use crate::error::{MError, MErrorCode, MResult};
use crate::variant::Variant;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Hexadecimal character for a number below 16, uppercase.
pub fn number_to_hex_char(n: u32) -> MResult<char> {
    match n {
        0..=9 => Ok((b'0' + n as u8) as char),
        10..=15 => Ok((b'A' + n as u8 - 10) as char),
        _ => Err(MError::check_integer_range(0, 15, i64::from(n)).unwrap_err()),
    }
}

/// Number for one hexadecimal character.
pub fn hex_char_to_number(c: char) -> MResult<u32> {
    c.to_digit(16).ok_or_else(|| {
        MError::software(
            MErrorCode::UnexpectedCharacter,
            format!("Character '{}' is not a hexadecimal digit", c.escape_default()),
        )
    })
}

/// Convert bytes to a hexadecimal string under a template.
///
/// A boolean template selects byte pairs with (`true`) or without
/// (`false`) blank separators. A string template is interpreted
/// character-wise: each `X` or `x` becomes one hexadecimal digit in that
/// case, whitespace is copied, anything else is illegal. A template
/// shorter than the input repeats cyclically; a longer one is cut.
pub fn bytes_to_hex(bytes: &[u8], format: &Variant) -> MResult<String> {
    let template = match format {
        Variant::String(_) | Variant::ByteString(_) => format.as_string()?,
        other => {
            if other.as_bool() {
                "XX ".to_string()
            } else {
                "XX".to_string()
            }
        }
    };
    buffer_to_hex(bytes, &template)
}

/// Template-driven hex formatting; see [`bytes_to_hex`].
pub fn buffer_to_hex(bytes: &[u8], template: &str) -> MResult<String> {
    let chars: Vec<char> = template.chars().collect();
    if !chars.iter().any(|&c| c == 'X' || c == 'x') {
        return Err(MError::software(
            MErrorCode::BadConversion,
            format!("Bad hex format '{}'", crate::error::visualize_str(template)),
        ));
    }
    for &c in &chars {
        if c != 'X' && c != 'x' && !c.is_whitespace() {
            return Err(MError::software(
                MErrorCode::BadConversion,
                format!("Bad hex format '{}'", crate::error::visualize_str(template)),
            ));
        }
    }

    let mut out = String::with_capacity(bytes.len() * 3);
    let mut t = 0usize;
    // One nibble per template X; the nibble stream is byte-ordered
    // high-first.
    let mut nibbles = bytes.iter().flat_map(|&b| [b >> 4, b & 0x0F]);
    let mut pending = nibbles.next();
    while let Some(nibble) = pending {
        let c = chars[t % chars.len()];
        t += 1;
        match c {
            'X' => out.push(number_to_hex_char(u32::from(nibble))?),
            'x' => out.push(number_to_hex_char(u32::from(nibble))?.to_ascii_lowercase()),
            _ => {
                out.push(c);
                continue;
            }
        }
        pending = nibbles.next();
    }
    // Trailing whitespace of a partially consumed template is dropped
    Ok(out.trim_end().to_string())
}

/// Convert a hexadecimal string to bytes. Separator characters are
/// skipped; any alphanumeric character must be a hexadecimal digit.
pub fn hex_to_bytes(hex: &str) -> MResult<Vec<u8>> {
    let mut digits = Vec::with_capacity(hex.len());
    for c in hex.chars() {
        if c.is_alphanumeric() {
            digits.push(hex_char_to_number(c)? as u8);
        }
    }
    if digits.len() % 2 != 0 {
        return Err(MError::software(
            MErrorCode::BadConversion,
            format!(
                "Hex string '{}' has an odd number of digits",
                crate::error::visualize_str(hex)
            ),
        ));
    }
    Ok(digits.chunks_exact(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

/// Convert bytes into a numeric string, decimal byte values under a
/// template. An empty template means `"b."`, the dotted form of an IP
/// address or OBIS code. Each `b` or `B` becomes the decimal value of a
/// byte; letters, digits, and non-ASCII codes are otherwise illegal;
/// punctuation and space are copied. The template repeats cyclically.
pub fn bytes_to_numeric_string(bytes: &[u8], template: &str) -> MResult<String> {
    let template = if template.is_empty() { "b." } else { template };
    let chars: Vec<char> = template.chars().collect();
    let mut prev_was_number = false;
    for &c in &chars {
        let is_number = c == 'b' || c == 'B';
        if is_number && prev_was_number {
            return Err(bad_numeric_format(template));
        }
        if !is_number && (c.is_alphanumeric() || !c.is_ascii()) {
            return Err(bad_numeric_format(template));
        }
        prev_was_number = is_number;
    }
    if !chars.iter().any(|&c| c == 'b' || c == 'B') {
        return Err(bad_numeric_format(template));
    }

    let mut out = String::new();
    let mut t = 0usize;
    let mut bytes_it = bytes.iter();
    let mut pending = bytes_it.next();
    while let Some(&byte) = pending {
        let c = chars[t % chars.len()];
        t += 1;
        if c == 'b' || c == 'B' {
            out.push_str(&byte.to_string());
            pending = bytes_it.next();
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

#[track_caller]
fn bad_numeric_format(template: &str) -> MError {
    MError::software(
        MErrorCode::BadConversion,
        format!(
            "Bad numeric format '{}'",
            crate::error::visualize_str(template)
        ),
    )
}

/// Convert a numeric string back to bytes: every digit run is the decimal
/// value of one byte, any other ASCII punctuation separates. Letters and
/// non-ASCII codes are illegal, as are values over 255.
pub fn numeric_string_to_bytes(text: &str) -> MResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut current: Option<u32> = None;
    for c in text.chars() {
        if let Some(d) = c.to_digit(10) {
            let value = current.unwrap_or(0) * 10 + d;
            if value > 255 {
                return Err(MError::software(
                    MErrorCode::NumberOutOfRange,
                    format!("Byte value {} is out of range 0 .. 255", value),
                ));
            }
            current = Some(value);
        } else {
            if c.is_alphanumeric() || !c.is_ascii() {
                return Err(MError::software(
                    MErrorCode::UnexpectedCharacter,
                    format!("Character '{}' is unexpected in a numeric string", c.escape_default()),
                ));
            }
            if let Some(value) = current.take() {
                out.push(value as u8);
            }
        }
    }
    if let Some(value) = current {
        out.push(value as u8);
    }
    Ok(out)
}

/// Interpret 1 to 8 bytes as an unsigned number per the rules for UINT
/// fields; results wider than 4 bytes widen to Double.
pub fn from_uint(bytes: &[u8], little_endian: bool) -> MResult<Variant> {
    MError::check_named_integer_range(1, 8, bytes.len() as i64, "UintSize")?;
    let mut value: u64 = 0;
    if little_endian {
        for &b in bytes.iter().rev() {
            value = (value << 8) | u64::from(b);
        }
    } else {
        for &b in bytes {
            value = (value << 8) | u64::from(b);
        }
    }
    if bytes.len() <= 4 {
        Ok(Variant::UInt(value as u32))
    } else {
        Ok(Variant::Double(value as f64))
    }
}

/// Marshal a positive number into `size` bytes as a UINT field. A
/// byte-string value is copied (little endian) or reversed (big endian).
pub fn to_uint(value: &Variant, size: usize, little_endian: bool) -> MResult<Vec<u8>> {
    MError::check_named_integer_range(1, 8, size as i64, "UintSize")?;
    if value.is_indexed() && !value.is_numeric() {
        let mut bytes = value.as_byte_string()?;
        MError::check_named_integer_range(1, 8, bytes.len() as i64, "UintSize")?;
        if !little_endian {
            bytes.reverse();
        }
        return Ok(bytes);
    }
    let number = value.as_uint64()?;
    if size < 8 && number >= 1u64 << (8 * size) {
        return Err(MError::software(
            MErrorCode::NumberOutOfRange,
            format!("Value {} does not fit in {} bytes", number, size),
        ));
    }
    let le = number.to_le_bytes();
    let mut bytes = le[..size].to_vec();
    if !little_endian {
        bytes.reverse();
    }
    Ok(bytes)
}

/// Interpret 1 to 8 bytes as a signed number per the rules for INT
/// fields; results wider than 4 bytes widen to Double.
pub fn from_int(bytes: &[u8], little_endian: bool) -> MResult<Variant> {
    MError::check_named_integer_range(1, 8, bytes.len() as i64, "IntSize")?;
    let mut value: u64 = 0;
    let ordered: Vec<u8> = if little_endian {
        bytes.iter().rev().copied().collect()
    } else {
        bytes.to_vec()
    };
    for &b in &ordered {
        value = (value << 8) | u64::from(b);
    }
    // Sign-extend from the leading byte
    let bits = bytes.len() * 8;
    let signed = if bits < 64 && value & (1 << (bits - 1)) != 0 {
        (value | !((1u64 << bits) - 1)) as i64
    } else {
        value as i64
    };
    if bytes.len() <= 4 {
        Ok(Variant::Int(signed as i32))
    } else {
        Ok(Variant::Double(signed as f64))
    }
}

/// Marshal an integer into `size` bytes as an INT field.
pub fn to_int(value: &Variant, size: usize, little_endian: bool) -> MResult<Vec<u8>> {
    MError::check_named_integer_range(1, 8, size as i64, "IntSize")?;
    if value.is_indexed() && !value.is_numeric() {
        return to_uint(value, size, little_endian);
    }
    let number = value.as_int64()?;
    if size < 8 {
        let bits = 8 * size as u32;
        let lo = -(1i64 << (bits - 1));
        let hi = (1i64 << (bits - 1)) - 1;
        if number < lo || number > hi {
            return Err(MError::software(
                MErrorCode::NumberOutOfRange,
                format!("Value {} does not fit in {} bytes", number, size),
            ));
        }
    }
    let le = number.to_le_bytes();
    let mut bytes = le[..size].to_vec();
    if !little_endian {
        bytes.reverse();
    }
    Ok(bytes)
}

/// RFC 4648 Base64 encoding.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// RFC 4648 Base64 decoding.
pub fn base64_decode(text: &str) -> MResult<Vec<u8>> {
    BASE64.decode(text.trim()).map_err(|e| {
        MError::software(
            MErrorCode::BadConversion,
            format!("Bad Base64 text: {}", e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let bytes = hex_to_bytes("01 02 03").unwrap();
        assert_eq!(bytes, [0x01, 0x02, 0x03]);
        assert_eq!(hex_to_bytes("0102FF").unwrap(), [0x01, 0x02, 0xFF]);
        assert!(hex_to_bytes("0g").is_err());
        assert!(hex_to_bytes("012").is_err());
    }

    #[test]
    fn test_bytes_to_hex_templates() {
        let bytes = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        assert_eq!(
            buffer_to_hex(&bytes, "XXXX XXXX  ").unwrap(),
            "1234 5678  9ABC DEF0"
        );
        assert_eq!(
            buffer_to_hex(&bytes, "xx ").unwrap(),
            "12 34 56 78 9a bc de f0"
        );
        assert_eq!(
            bytes_to_hex(&[0xAB, 0xCD], &Variant::Bool(true)).unwrap(),
            "AB CD"
        );
        assert_eq!(
            bytes_to_hex(&[0xAB, 0xCD], &Variant::Bool(false)).unwrap(),
            "ABCD"
        );
        assert!(buffer_to_hex(&bytes, "X-X").is_err());
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(
            bytes_to_numeric_string(&[1, 0, 64, 0, 0, 255], "").unwrap(),
            "1.0.64.0.0.255"
        );
        assert_eq!(
            numeric_string_to_bytes("1.0.64.0.0.255 1-5").unwrap(),
            [1, 0, 64, 0, 0, 255, 1, 5]
        );
        assert!(numeric_string_to_bytes("1.256").is_err());
        assert!(numeric_string_to_bytes("1.a").is_err());
        assert!(bytes_to_numeric_string(&[1], "bb").is_err());
    }

    #[test]
    fn test_uint_fields() {
        assert_eq!(
            from_uint(&[0x01, 0x02], false).unwrap(),
            Variant::UInt(0x0102)
        );
        assert_eq!(
            from_uint(&[0x01, 0x02], true).unwrap(),
            Variant::UInt(0x0201)
        );
        let wide = from_uint(&[0xFF; 8], false).unwrap();
        assert!(matches!(wide, Variant::Double(_)));

        assert_eq!(
            to_uint(&Variant::UInt(0x0102), 2, false).unwrap(),
            [0x01, 0x02]
        );
        assert_eq!(
            to_uint(&Variant::UInt(0x0102), 2, true).unwrap(),
            [0x02, 0x01]
        );
        assert!(to_uint(&Variant::UInt(0x10000), 2, true).is_err());
    }

    #[test]
    fn test_int_fields() {
        assert_eq!(from_int(&[0xFF], false).unwrap(), Variant::Int(-1));
        assert_eq!(from_int(&[0x7F], false).unwrap(), Variant::Int(127));
        assert_eq!(
            from_int(&[0xFE, 0xFF], true).unwrap(),
            Variant::Int(-2)
        );
        assert_eq!(to_int(&Variant::Int(-2), 2, true).unwrap(), [0xFE, 0xFF]);
        assert!(to_int(&Variant::Int(200), 1, true).is_err());
    }

    #[test]
    fn test_base64() {
        assert_eq!(base64_encode(b"foobar"), "Zm9vYmFy");
        assert_eq!(base64_decode("Zm9vYmFy").unwrap(), b"foobar");
        assert!(base64_decode("!!!").is_err());
    }

    #[test]
    fn test_hex_chars() {
        assert_eq!(number_to_hex_char(10).unwrap(), 'A');
        assert_eq!(hex_char_to_number('a').unwrap(), 10);
        assert!(number_to_hex_char(16).is_err());
        assert!(hex_char_to_number('g').is_err());
    }
}
