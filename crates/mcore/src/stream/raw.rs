// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reflected raw wire codec for variants.
//!
//! Each value is a 4-byte little-endian type tag followed by a
//! kind-specific body: scalars in their wire width, strings and byte
//! strings length-prefixed, collections recursive. Strings travel as
//! UTF-8, one byte per unit. Map and the kinds beyond it are refused;
//! collection counts are validated against `[0, 0xFFFFFF]` on read.

use super::Stream;
use crate::error::{MError, MResult};
use crate::variant::{Variant, VariantKind};

/// Upper bound on a serialized collection count.
const MAXIMUM_COLLECTION_COUNT: i64 = 0xFF_FFFF;

impl Stream {
    // Primitive raw accessors -------------------------------------------

    pub fn read_raw_int(&mut self) -> MResult<i32> {
        let mut bytes = [0u8; 4];
        self.read_bytes(&mut bytes)?;
        Ok(i32::from_le_bytes(bytes))
    }

    pub fn write_raw_int(&mut self, value: i32) -> MResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn read_raw_byte(&mut self) -> MResult<u8> {
        let mut bytes = [0u8; 1];
        self.read_bytes(&mut bytes)?;
        Ok(bytes[0])
    }

    pub fn read_raw_char(&mut self) -> MResult<char> {
        Ok(self.read_raw_byte()? as char)
    }

    pub fn write_raw_char(&mut self, value: char) -> MResult<()> {
        self.write_byte(value as u8)
    }

    pub fn read_raw_bool(&mut self) -> MResult<bool> {
        Ok(self.read_raw_byte()? != 0)
    }

    pub fn write_raw_bool(&mut self, value: bool) -> MResult<()> {
        self.write_byte(u8::from(value))
    }

    pub fn read_raw_double(&mut self) -> MResult<f64> {
        let mut bytes = [0u8; 8];
        self.read_bytes(&mut bytes)?;
        Ok(f64::from_le_bytes(bytes))
    }

    pub fn write_raw_double(&mut self, value: f64) -> MResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn read_raw_byte_string(&mut self) -> MResult<Vec<u8>> {
        let length = self.read_raw_int()?;
        MError::check_named_integer_range(0, MAXIMUM_COLLECTION_COUNT, i64::from(length), "ByteStringCount")?;
        self.read(length as usize)
    }

    pub fn write_raw_byte_string(&mut self, value: &[u8]) -> MResult<()> {
        self.write_raw_int(value.len() as i32)?;
        self.write_bytes(value)
    }

    pub fn read_raw_string(&mut self) -> MResult<String> {
        let bytes = self.read_raw_byte_string()?;
        String::from_utf8(bytes).map_err(|_| {
            MError::plain(
                crate::error::MErrorCode::BadConversion,
                "Serialized string is not valid UTF-8",
            )
        })
    }

    pub fn write_raw_string(&mut self, value: &str) -> MResult<()> {
        self.write_raw_byte_string(value.as_bytes())
    }

    // Variant codec ------------------------------------------------------

    /// Read one serialized variant.
    pub fn read_raw_variant(&mut self) -> MResult<Variant> {
        let tag = self.read_raw_int()? as u32;
        let kind = VariantKind::from_tag(tag).ok_or_else(|| MError::unsupported_type(tag))?;
        match kind {
            VariantKind::Empty => Ok(Variant::Empty),
            VariantKind::Bool => Ok(Variant::Bool(self.read_raw_bool()?)),
            VariantKind::Byte => Ok(Variant::Byte(self.read_raw_byte()?)),
            VariantKind::Char => Ok(Variant::Char(self.read_raw_char()?)),
            VariantKind::Int => Ok(Variant::Int(self.read_raw_int()?)),
            VariantKind::UInt => Ok(Variant::UInt(self.read_raw_int()? as u32)),
            VariantKind::Double => Ok(Variant::Double(self.read_raw_double()?)),
            VariantKind::ByteString => Ok(Variant::byte_string(self.read_raw_byte_string()?)),
            VariantKind::String => Ok(Variant::from(self.read_raw_string()?)),
            VariantKind::StringCollection => {
                let count = self.read_raw_int()?;
                MError::check_named_integer_range(
                    0,
                    MAXIMUM_COLLECTION_COUNT,
                    i64::from(count),
                    "StringCollectionCount",
                )?;
                let mut items = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    items.push(self.read_raw_string()?);
                }
                Ok(Variant::from(items))
            }
            VariantKind::VariantCollection => {
                let count = self.read_raw_int()?;
                MError::check_named_integer_range(
                    0,
                    MAXIMUM_COLLECTION_COUNT,
                    i64::from(count),
                    "VariantCollectionCount",
                )?;
                let mut items = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    items.push(self.read_raw_variant()?);
                }
                Ok(Variant::from(items))
            }
            _ => Err(MError::unsupported_type(tag)),
        }
    }

    /// Write one variant; objects, maps, and the meta kind are refused.
    pub fn write_raw_variant(&mut self, value: &Variant) -> MResult<()> {
        let kind = value.kind();
        if matches!(
            kind,
            VariantKind::Object
                | VariantKind::ObjectEmbedded
                | VariantKind::Map
                | VariantKind::VariantMeta
        ) {
            return Err(MError::unsupported_type(kind.tag()));
        }
        self.write_raw_int(kind.tag() as i32)?;
        match value {
            Variant::Empty => Ok(()),
            Variant::Bool(b) => self.write_raw_bool(*b),
            Variant::Byte(b) => self.write_byte(*b),
            Variant::Char(c) => self.write_raw_char(*c),
            Variant::Int(_) | Variant::UInt(_) => self.write_raw_int(value.as_dword()? as i32),
            Variant::Double(d) => self.write_raw_double(*d),
            Variant::ByteString(_) => self.write_raw_byte_string(&value.as_byte_string()?),
            Variant::String(_) => self.write_raw_string(&value.as_string()?),
            Variant::StringCollection(items) => {
                self.write_raw_int(items.len() as i32)?;
                for item in items.iter() {
                    self.write_raw_string(&item.as_string()?)?;
                }
                Ok(())
            }
            Variant::Collection(items) => {
                self.write_raw_int(items.len() as i32)?;
                for item in items.iter() {
                    self.write_raw_variant(item)?;
                }
                Ok(())
            }
            _ => unreachable!("kind gate above"),
        }
    }
}
