// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Utility codecs of the metering data model: BCD, RAD40, DSP numerics,
//! hex with formatting templates, numeric byte strings, UINT/INT field
//! marshalling, and Base64.

mod bcd;
mod bytes;
mod dsp;
mod rad40;

pub use bcd::{from_bcd, to_bcd};
pub use bytes::{
    base64_decode, base64_encode, buffer_to_hex, bytes_to_hex, bytes_to_numeric_string, from_int,
    from_uint, hex_char_to_number, hex_to_bytes, number_to_hex_char, numeric_string_to_bytes,
    to_int, to_uint,
};
pub use dsp::{from_dsp_float, from_dsp_int, from_instr, to_dsp_float, to_dsp_int, to_instr};
pub use rad40::{from_rad40, to_rad40};
