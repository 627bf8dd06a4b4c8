// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DSP numeric formats of the metering hardware.
//!
//! A DSP float is the TI-style short float: a leading two's-complement
//! exponent byte, then a sign bit and a mantissa fraction (15 bits in the
//! 3-byte form, 23 bits in the 4-byte form); the value is
//! `2^exp * (1 + m)` for positive and `2^exp * (-2 + m)` for negative
//! numbers, and an exponent of -128 encodes zero. A DSP int is a plain
//! two's-complement fraction in [-1.0, 1.0), scaled by `2^(bits - 1)`.
//! The INSTR instrumentation value is the 2-byte DSP int.

use crate::error::{MError, MErrorCode, MResult};

fn check_dsp_float_size(size: usize) -> MResult<()> {
    if size != 3 && size != 4 {
        return Err(MError::software(
            MErrorCode::NumberOutOfRange,
            format!("DSP float size {} is invalid, expected 3 or 4", size),
        ));
    }
    Ok(())
}

/// Decode a DSP float of 3 or 4 bytes, big-endian mantissa.
pub fn from_dsp_float(buffer: &[u8]) -> MResult<f64> {
    check_dsp_float_size(buffer.len())?;
    let exponent = buffer[0] as i8;
    let mantissa_bits = (buffer.len() - 1) * 8 - 1;
    let mut raw: u32 = 0;
    for &b in &buffer[1..] {
        raw = (raw << 8) | u32::from(b);
    }
    let sign = raw >> mantissa_bits != 0;
    let fraction = f64::from(raw & ((1 << mantissa_bits) - 1)) / f64::from(1u32 << mantissa_bits);
    if exponent == -128 {
        return Ok(0.0);
    }
    let significand = if sign { -2.0 + fraction } else { 1.0 + fraction };
    Ok(significand * (exponent as f64).exp2())
}

/// Encode a double as a DSP float of 3 or 4 bytes.
pub fn to_dsp_float(value: f64, size: usize) -> MResult<Vec<u8>> {
    check_dsp_float_size(size)?;
    let mantissa_bits = (size - 1) * 8 - 1;
    let mut out = vec![0u8; size];
    if value == 0.0 {
        out[0] = 0x80; // exponent -128 encodes zero
        return Ok(out);
    }

    let negative = value < 0.0;
    let magnitude = value.abs();
    let mut exponent = magnitude.log2().floor() as i32;
    // Normalize the significand into [1, 2)
    let mut significand = magnitude / (exponent as f64).exp2();
    if significand >= 2.0 {
        significand /= 2.0;
        exponent += 1;
    }

    let scale = f64::from(1u32 << mantissa_bits);
    let raw: u32 = if negative {
        // 2^e * (-2 + m): m runs (0, 1], a power of two lands on m = 0
        // one exponent down
        let mut bits = ((2.0 - significand) * scale).round() as u32;
        if bits >= 1 << mantissa_bits {
            exponent -= 1;
            bits = 0;
        }
        (1 << mantissa_bits) | bits
    } else {
        // 2^e * (1 + m): rounding up to m = 1 carries into the exponent
        let mut bits = ((significand - 1.0) * scale).round() as u32;
        if bits >= 1 << mantissa_bits {
            exponent += 1;
            bits = 0;
        }
        bits
    };
    if !(-127..=127).contains(&exponent) {
        return Err(MError::software(
            MErrorCode::NumberOutOfRange,
            format!("Value {} is out of DSP float range", value),
        ));
    }

    out[0] = exponent as i8 as u8;
    for (i, byte) in out[1..].iter_mut().rev().enumerate() {
        *byte = (raw >> (8 * i)) as u8;
    }
    Ok(out)
}

/// Decode a DSP int: a two's-complement fraction in [-1.0, 1.0),
/// big-endian.
pub fn from_dsp_int(buffer: &[u8]) -> MResult<f64> {
    if buffer.is_empty() || buffer.len() > 4 {
        return Err(MError::software(
            MErrorCode::NumberOutOfRange,
            format!("DSP int size {} is invalid, expected 1 to 4", buffer.len()),
        ));
    }
    let bits = buffer.len() * 8;
    let mut raw: u32 = 0;
    for &b in buffer {
        raw = (raw << 8) | u32::from(b);
    }
    let signed = if raw & (1 << (bits - 1)) != 0 {
        raw as i64 - (1i64 << bits)
    } else {
        raw as i64
    };
    Ok(signed as f64 / (1i64 << (bits - 1)) as f64)
}

/// Encode a fraction in [-1.0, 1.0) as a DSP int of `size` bytes.
pub fn to_dsp_int(value: f64, size: usize) -> MResult<Vec<u8>> {
    if size == 0 || size > 4 {
        return Err(MError::software(
            MErrorCode::NumberOutOfRange,
            format!("DSP int size {} is invalid, expected 1 to 4", size),
        ));
    }
    if !(-1.0..1.0).contains(&value) {
        return Err(MError::software(
            MErrorCode::NumberOutOfRange,
            format!("Value {} is out of range -1 .. 1", value),
        ));
    }
    let bits = size * 8;
    let scaled = (value * (1i64 << (bits - 1)) as f64).round() as i64;
    // Rounding at the very top of the range folds back to the maximum
    let max = (1i64 << (bits - 1)) - 1;
    let clamped = scaled.min(max);
    let raw = (clamped & ((1i64 << bits) - 1)) as u32;
    Ok((0..size).rev().map(|i| (raw >> (8 * i)) as u8).collect())
}

/// Decode the 2-byte INSTR instrumentation value.
pub fn from_instr(buffer: &[u8]) -> MResult<f64> {
    if buffer.len() != 2 {
        return Err(MError::software(
            MErrorCode::NumberOutOfRange,
            format!("INSTR size {} is invalid, expected 2", buffer.len()),
        ));
    }
    from_dsp_int(buffer)
}

/// Encode the 2-byte INSTR instrumentation value.
pub fn to_instr(value: f64) -> MResult<Vec<u8>> {
    to_dsp_int(value, 2)
}
