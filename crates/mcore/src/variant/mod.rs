// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamically typed value with copy-on-write storage.
//!
//! [`Variant`] carries one of a closed set of kinds: scalars, strings with
//! small-buffer optimization, shared collections, maps, and object
//! references. Clones are O(1); shared payloads are unshared at the first
//! mutation. Promotion, indexing, and conversion rules follow the metering
//! data model: `Bool < Byte < Char < UInt < Int < Double`, Perl-style
//! truthiness, Pythonic negative indices and slices.
//!
//! The textual round-trip form ("MDL constant") lives in [`mdl`] (writer)
//! and [`parser`] (reader).

mod buffer;
mod index;
mod mdl;
mod ops;
mod parser;

#[cfg(test)]
mod tests;

pub use buffer::{VarBytes, INLINE_CAPACITY};
pub use mdl::{to_mdl_constant, to_relaxed_mdl_constant};
pub use parser::from_mdl_constant;

use crate::error::{MError, MErrorCode, MResult};
use crate::reflect::MObject;
use std::sync::Arc;

/// Shared object reference held by object-kind variants.
pub type ObjectRef = Arc<dyn MObject>;

/// Shared element storage for collections and maps.
pub type VarVec = Arc<Vec<Variant>>;

/// Lowest numeric value a Char accepts from signed sources.
pub const CHAR_MIN: i32 = -128;
/// Highest numeric value a Char accepts; covers both signed and unsigned bytes.
pub const CHAR_MAX: i32 = 255;

/// Kind tag of a [`Variant`].
///
/// Discriminant order is the promotion order; the numeric values are also
/// the wire type tags of the raw stream codec. `VariantMeta` denotes "any
/// variant" in reflection signatures and bounds the raw codec; it is never
/// the kind of a live value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VariantKind {
    Empty = 0,
    Bool = 1,
    Byte = 2,
    Char = 3,
    UInt = 4,
    Int = 5,
    Double = 6,
    ByteString = 7,
    String = 8,
    StringCollection = 9,
    Object = 10,
    ObjectEmbedded = 11,
    VariantCollection = 12,
    Map = 13,
    VariantMeta = 14,
}

impl VariantKind {
    /// Kind for a raw wire tag, if the tag is valid.
    pub fn from_tag(tag: u32) -> Option<VariantKind> {
        Some(match tag {
            0 => VariantKind::Empty,
            1 => VariantKind::Bool,
            2 => VariantKind::Byte,
            3 => VariantKind::Char,
            4 => VariantKind::UInt,
            5 => VariantKind::Int,
            6 => VariantKind::Double,
            7 => VariantKind::ByteString,
            8 => VariantKind::String,
            9 => VariantKind::StringCollection,
            10 => VariantKind::Object,
            11 => VariantKind::ObjectEmbedded,
            12 => VariantKind::VariantCollection,
            13 => VariantKind::Map,
            14 => VariantKind::VariantMeta,
            _ => return None,
        })
    }

    pub fn tag(self) -> u32 {
        self as u32
    }

    pub fn is_numeric(self) -> bool {
        self >= VariantKind::Bool && self <= VariantKind::Double
    }
}

/// Dynamically typed value.
#[derive(Clone, Default)]
pub enum Variant {
    #[default]
    Empty,
    Bool(bool),
    Byte(u8),
    Char(char),
    UInt(u32),
    Int(i32),
    Double(f64),
    ByteString(VarBytes),
    String(VarBytes),
    StringCollection(VarVec),
    /// Object reference; `None` is the null object, equal to Empty.
    Object(Option<ObjectRef>),
    /// Value-copied small object.
    ObjectEmbedded(ObjectRef),
    Collection(VarVec),
    /// Interleaved `{k0, v0, k1, v1, ...}` pairs.
    Map(VarVec),
}

impl Variant {
    /// The null object singleton value.
    pub const NULL: Variant = Variant::Object(None);

    pub fn kind(&self) -> VariantKind {
        match self {
            Variant::Empty => VariantKind::Empty,
            Variant::Bool(_) => VariantKind::Bool,
            Variant::Byte(_) => VariantKind::Byte,
            Variant::Char(_) => VariantKind::Char,
            Variant::UInt(_) => VariantKind::UInt,
            Variant::Int(_) => VariantKind::Int,
            Variant::Double(_) => VariantKind::Double,
            Variant::ByteString(_) => VariantKind::ByteString,
            Variant::String(_) => VariantKind::String,
            Variant::StringCollection(_) => VariantKind::StringCollection,
            Variant::Object(_) => VariantKind::Object,
            Variant::ObjectEmbedded(_) => VariantKind::ObjectEmbedded,
            Variant::Collection(_) => VariantKind::VariantCollection,
            Variant::Map(_) => VariantKind::Map,
        }
    }

    /// Empty, or a null object reference.
    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty | Variant::Object(None))
    }

    /// Bool, Byte, Char, UInt, Int, or Double.
    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Variant::StringCollection(_) | Variant::Collection(_) | Variant::Map(_)
        )
    }

    /// Kinds that support item access and slicing.
    pub fn is_indexed(&self) -> bool {
        matches!(
            self,
            Variant::ByteString(_)
                | Variant::String(_)
                | Variant::StringCollection(_)
                | Variant::Collection(_)
                | Variant::Map(_)
        )
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Variant::Object(_) | Variant::ObjectEmbedded(_))
    }

    // Construction ------------------------------------------------------

    /// Byte-string constructor; disambiguates from the string kind.
    pub fn byte_string(bytes: impl AsRef<[u8]>) -> Variant {
        Variant::ByteString(VarBytes::from_slice(bytes.as_ref()))
    }

    /// Fresh empty map.
    pub fn map() -> Variant {
        Variant::Map(Arc::new(Vec::new()))
    }

    /// Fresh empty variant collection.
    pub fn collection() -> Variant {
        Variant::Collection(Arc::new(Vec::new()))
    }

    /// Fresh empty string collection.
    pub fn string_collection() -> Variant {
        Variant::StringCollection(Arc::new(Vec::new()))
    }

    /// Store an object reference. Objects that declare an embedded copy
    /// are stored by value as `ObjectEmbedded`; everything else is a
    /// shared `Object` reference.
    pub fn from_object(object: ObjectRef) -> Variant {
        match object.embedded_clone() {
            Some(copy) => Variant::ObjectEmbedded(copy),
            None => Variant::Object(Some(object)),
        }
    }

    /// Reset to Empty, releasing any storage.
    pub fn set_empty(&mut self) {
        *self = Variant::Empty;
    }

    /// Reset to Empty with ownership-transfer semantics: object references
    /// held here (and, recursively, inside collections) are released so the
    /// last owner is dropped.
    pub fn set_empty_with_object_delete(&mut self) {
        if let Variant::StringCollection(v) | Variant::Collection(v) | Variant::Map(v) = self {
            if let Some(items) = Arc::get_mut(v) {
                for item in items.iter_mut() {
                    item.set_empty_with_object_delete();
                }
            }
        }
        *self = Variant::Empty;
    }

    // Counting ----------------------------------------------------------

    /// Number of items: characters for strings, bytes for byte strings,
    /// elements for collections, entries for maps.
    pub fn count(&self) -> MResult<usize> {
        match self {
            Variant::String(b) => Ok(b.as_str().chars().count()),
            Variant::ByteString(b) => Ok(b.len()),
            Variant::StringCollection(v) | Variant::Collection(v) => Ok(v.len()),
            Variant::Map(v) => Ok(v.len() / 2),
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Resize a collection, filling with Empty elements.
    pub fn set_count(&mut self, count: usize) -> MResult<()> {
        match self {
            Variant::StringCollection(v) | Variant::Collection(v) => {
                Arc::make_mut(v).resize(count, Variant::Empty);
                Ok(())
            }
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    // Object access -----------------------------------------------------

    /// Object reference, or `None` for the null object. Int/UInt zero also
    /// reads as a null object by convention.
    pub fn as_object(&self) -> MResult<Option<&ObjectRef>> {
        match self {
            Variant::Object(o) => Ok(o.as_ref()),
            Variant::ObjectEmbedded(o) => Ok(Some(o)),
            Variant::Empty => Err(MError::no_value()),
            Variant::Int(0) | Variant::UInt(0) => Ok(None),
            _ => Err(MError::software(
                MErrorCode::BadConversion,
                "Could not convert variant to object reference",
            )),
        }
    }

    /// Object reference that must not be null.
    pub fn as_existing_object(&self) -> MResult<&ObjectRef> {
        self.as_object()?.ok_or_else(MError::no_value)
    }

    /// Mutable access to a uniquely held object. Fails when the reference
    /// is shared; objects are single-owner for mutation.
    pub fn object_mut(&mut self) -> MResult<&mut dyn MObject> {
        match self {
            Variant::Object(Some(o)) | Variant::ObjectEmbedded(o) => match Arc::get_mut(o) {
                Some(obj) => Ok(obj),
                None => Err(MError::software(
                    MErrorCode::OperationNotSupported,
                    "Cannot modify an object that is shared between variants",
                )),
            },
            Variant::Object(None) | Variant::Empty => Err(MError::no_value()),
            _ => Err(MError::software(
                MErrorCode::BadConversion,
                "Could not convert variant to object reference",
            )),
        }
    }

    // Interpretations ---------------------------------------------------

    /// Perl-style truthiness: `""`, `"0"`, `'\0'`, `"FALSE"`, zero numbers,
    /// null objects, and nonempty collections read as false by convention;
    /// Empty is false.
    pub fn as_bool(&self) -> bool {
        match self {
            Variant::Empty => false,
            Variant::Bool(b) => *b,
            Variant::Byte(b) => *b != 0,
            Variant::Char(c) => *c != '\0' && *c != '0',
            Variant::UInt(u) => *u != 0,
            Variant::Int(i) => *i != 0,
            Variant::Double(d) => *d != 0.0,
            Variant::ByteString(b) | Variant::String(b) => {
                let s = b.as_slice();
                match s.len() {
                    0 => false,
                    1 => s[0] != 0 && s[0] != b'0',
                    5 => s != b"FALSE",
                    _ => true,
                }
            }
            Variant::StringCollection(v) | Variant::Collection(v) | Variant::Map(v) => v.is_empty(),
            Variant::Object(o) => o.is_some(),
            Variant::ObjectEmbedded(_) => true,
        }
    }

    /// Single character; numeric sources are range-checked to
    /// `[CHAR_MIN, CHAR_MAX]`, strings must have exactly one item.
    pub fn as_char(&self) -> MResult<char> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::Bool(b) => Ok(if *b { '\u{1}' } else { '\0' }),
            Variant::Byte(b) => Ok(*b as char),
            Variant::Char(c) => Ok(*c),
            Variant::Int(_) | Variant::UInt(_) | Variant::Double(_) => {
                let val = self.as_rounded_i64()?;
                if val < CHAR_MIN as i64 || val > CHAR_MAX as i64 {
                    return Err(MError::software(
                        MErrorCode::BadConversion,
                        format!("Could not convert '{}' to a single character", val),
                    ));
                }
                Ok((val as u8) as char)
            }
            Variant::ByteString(_) | Variant::String(_) => {
                if self.count()? != 1 {
                    return Err(MError::software(
                        MErrorCode::BadConversion,
                        format!(
                            "Could not convert a string of size {} to a single character",
                            self.count()?
                        ),
                    ));
                }
                match self {
                    Variant::ByteString(b) => Ok(b.as_slice()[0] as char),
                    Variant::String(b) => Ok(b.as_str().chars().next().unwrap_or('\0')),
                    _ => unreachable!(),
                }
            }
            _ => self.client_value("Could not convert variant containing object reference to a character")?.as_char(),
        }
    }

    /// Single byte with range check `[0, 255]`.
    pub fn as_byte(&self) -> MResult<u8> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::Bool(b) => Ok(u8::from(*b)),
            Variant::Byte(b) => Ok(*b),
            Variant::Char(c) => {
                let v = *c as u32;
                MError::check_integer_range(0, 255, v as i64)?;
                Ok(v as u8)
            }
            Variant::Int(_) | Variant::UInt(_) | Variant::Double(_) => {
                let val = self.as_rounded_i64()?;
                MError::check_integer_range(0, 255, val)?;
                Ok(val as u8)
            }
            Variant::ByteString(_) | Variant::String(_) => {
                if self.count()? != 1 {
                    return Err(MError::software(
                        MErrorCode::BadConversion,
                        format!(
                            "Could not convert a string of size {} to a single byte",
                            self.count()?
                        ),
                    ));
                }
                Ok(self.as_byte_string()?[0])
            }
            _ => self.client_value("Could not convert variant containing object reference to a character")?.as_byte(),
        }
    }

    pub fn as_int(&self) -> MResult<i32> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::Bool(b) => Ok(i32::from(*b)),
            Variant::Byte(b) => Ok(i32::from(*b)),
            Variant::Char(c) => Ok(*c as i32),
            Variant::Int(i) => Ok(*i),
            Variant::UInt(u) => {
                if *u > i32::MAX as u32 {
                    return Err(MError::software(
                        MErrorCode::BadConversion,
                        format!("Could not convert '{}' to integer", u),
                    ));
                }
                Ok(*u as i32)
            }
            Variant::Double(d) => {
                let val = d.round();
                MError::check_double_range(i32::MIN as f64, i32::MAX as f64, val)?;
                Ok(val as i32)
            }
            Variant::ByteString(_) | Variant::String(_) => parse_int(&self.text()?),
            _ => self.client_value("Could not convert variant containing object reference to a numeric value")?.as_int(),
        }
    }

    pub fn as_uint(&self) -> MResult<u32> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::Bool(b) => Ok(u32::from(*b)),
            Variant::Byte(b) => Ok(u32::from(*b)),
            Variant::Char(c) => Ok(*c as u32),
            Variant::Int(i) => {
                if *i < 0 {
                    return Err(MError::software(
                        MErrorCode::BadConversion,
                        format!("Could not convert '{}' to unsigned integer", i),
                    ));
                }
                Ok(*i as u32)
            }
            Variant::UInt(u) => Ok(*u),
            Variant::Double(d) => {
                let val = d.round();
                if val < 0.0 || val > u32::MAX as f64 {
                    return Err(MError::software(
                        MErrorCode::BadConversion,
                        format!("Could not convert '{}' to unsigned integer", val),
                    ));
                }
                Ok(val as u32)
            }
            Variant::ByteString(_) | Variant::String(_) => parse_uint(&self.text()?),
            _ => self.client_value("Could not convert variant containing object reference to a numeric value")?.as_uint(),
        }
    }

    pub fn as_int64(&self) -> MResult<i64> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::UInt(u) => Ok(i64::from(*u)),
            Variant::Double(d) => {
                let val = d.round();
                MError::check_double_range(i64::MIN as f64, i64::MAX as f64, val)?;
                Ok(val as i64)
            }
            Variant::ByteString(_) | Variant::String(_) => parse_int64(&self.text()?),
            _ if self.is_numeric() => Ok(i64::from(self.as_int()?)),
            _ => self.client_value("Could not convert variant containing object reference to a numeric value")?.as_int64(),
        }
    }

    pub fn as_uint64(&self) -> MResult<u64> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::UInt(u) => Ok(u64::from(*u)),
            Variant::Int(i) => {
                if *i < 0 {
                    return Err(MError::software(
                        MErrorCode::BadConversion,
                        format!("Could not convert '{}' to unsigned integer", i),
                    ));
                }
                Ok(*i as u64)
            }
            Variant::Double(d) => {
                let val = d.round();
                if val < 0.0 || val > u64::MAX as f64 {
                    return Err(MError::software(
                        MErrorCode::BadConversion,
                        format!("Could not convert '{}' to unsigned integer", val),
                    ));
                }
                Ok(val as u64)
            }
            Variant::ByteString(_) | Variant::String(_) => parse_uint64(&self.text()?),
            _ if self.is_numeric() => Ok(u64::from(self.as_uint()?)),
            _ => self.client_value("Could not convert variant containing object reference to a numeric value")?.as_uint64(),
        }
    }

    pub fn as_double(&self) -> MResult<f64> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::Bool(b) => Ok(f64::from(u8::from(*b))),
            Variant::Byte(b) => Ok(f64::from(*b)),
            Variant::Char(c) => Ok(f64::from(*c as u32)),
            Variant::UInt(u) => Ok(f64::from(*u)),
            Variant::Int(i) => Ok(f64::from(*i)),
            Variant::Double(d) => Ok(*d),
            Variant::ByteString(_) | Variant::String(_) => parse_double(&self.text()?),
            _ => self.client_value("Could not convert variant containing object reference to a numeric value")?.as_double(),
        }
    }

    /// Textual rendering: numbers in decimal, booleans as `0`/`1`, strings
    /// verbatim, collections as concatenated characters.
    pub fn as_string(&self) -> MResult<String> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::Bool(b) => Ok(i32::from(*b).to_string()),
            Variant::Byte(b) => Ok((*b as char).to_string()),
            Variant::Char(c) => Ok(c.to_string()),
            Variant::UInt(u) => Ok(u.to_string()),
            Variant::Int(i) => Ok(i.to_string()),
            Variant::Double(d) => Ok(format_double(*d)),
            Variant::String(b) => Ok(b.as_str().to_string()),
            Variant::ByteString(b) => Ok(b.as_slice().iter().map(|&c| c as char).collect()),
            Variant::StringCollection(v) | Variant::Collection(v) => {
                let mut result = String::with_capacity(v.len());
                for item in v.iter() {
                    result.push(item.as_char()?);
                }
                Ok(result)
            }
            Variant::Map(_) => Err(MError::software(
                MErrorCode::BadConversion,
                "Could not convert map to a string value",
            )),
            Variant::Object(_) | Variant::ObjectEmbedded(_) => {
                let obj = self.as_existing_object()?;
                if obj.as_ref().is_property_present("AsString") {
                    return obj.as_ref().get_property("AsString")?.as_string();
                }
                self.client_value("Could not convert variant containing object reference to a string value")?
                    .as_string()
            }
        }
    }

    /// Raw byte rendering: scalars in their wire width (LE), strings as
    /// their bytes, collections as their per-item bytes.
    pub fn as_byte_string(&self) -> MResult<Vec<u8>> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::Bool(b) => Ok(vec![u8::from(*b)]),
            Variant::Byte(b) => Ok(vec![*b]),
            Variant::Char(c) => Ok(vec![*c as u8]),
            Variant::Int(i) => Ok(i.to_le_bytes().to_vec()),
            Variant::UInt(u) => Ok(u.to_le_bytes().to_vec()),
            Variant::Double(d) => Ok(d.to_le_bytes().to_vec()),
            Variant::ByteString(b) | Variant::String(b) => Ok(b.as_slice().to_vec()),
            Variant::StringCollection(v) | Variant::Collection(v) => {
                let mut result = Vec::with_capacity(v.len());
                for item in v.iter() {
                    result.push(item.as_byte()?);
                }
                Ok(result)
            }
            _ => self.client_value("Could not convert variant containing object reference to a string value")?
                .as_byte_string(),
        }
    }

    pub fn as_string_collection(&self) -> MResult<Vec<String>> {
        if self.is_collection() {
            let items = self.elements()?;
            let mut result = Vec::with_capacity(items.len());
            for item in items.iter() {
                if item.is_empty() {
                    result.push(String::new());
                } else {
                    result.push(item.as_string()?);
                }
            }
            Ok(result)
        } else {
            Ok(vec![self.as_string()?])
        }
    }

    pub fn as_variant_collection(&self) -> MResult<Vec<Variant>> {
        if self.is_collection() {
            Ok(self.elements()?.to_vec())
        } else if self.is_empty() {
            Err(MError::no_value())
        } else {
            Ok(vec![self.clone()])
        }
    }

    /// Power of two numeric interpretations.
    pub fn pow(&self, exponent: &Variant) -> MResult<Variant> {
        Ok(Variant::Double(self.as_double()?.powf(exponent.as_double()?)))
    }

    /// Quoted, length-clamped rendering for error messages.
    pub fn visualize(&self) -> String {
        match self {
            Variant::Empty => "EMPTY".to_string(),
            Variant::Object(_) | Variant::ObjectEmbedded(_) => "<object>".to_string(),
            Variant::Map(_) | Variant::Collection(_) | Variant::StringCollection(_) => {
                mdl::to_mdl_constant(self).map_or_else(|_| "<collection>".to_string(), |s| crate::error::visualize_str(&s))
            }
            _ => self
                .as_string()
                .map_or_else(|_| "?".to_string(), |s| crate::error::visualize_str(&s)),
        }
    }

    // Internal helpers --------------------------------------------------

    /// Interleaved element storage of any collection kind.
    pub(crate) fn elements(&self) -> MResult<&[Variant]> {
        match self {
            Variant::StringCollection(v) | Variant::Collection(v) | Variant::Map(v) => Ok(v),
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Unshared, mutable element storage (copy-on-write point).
    pub(crate) fn elements_mut(&mut self) -> MResult<&mut Vec<Variant>> {
        match self {
            Variant::StringCollection(v) | Variant::Collection(v) | Variant::Map(v) => {
                Ok(Arc::make_mut(v))
            }
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Objects convert through their reflected `Value` property.
    fn client_value(&self, message: &str) -> MResult<Variant> {
        if self.is_object() {
            if let Ok(Some(obj)) = self.as_object() {
                if obj.as_ref().is_property_present("Value") {
                    return obj.as_ref().get_property("Value");
                }
            }
        }
        Err(MError::plain(MErrorCode::BadConversion, message))
    }

    fn as_rounded_i64(&self) -> MResult<i64> {
        match self {
            Variant::Int(i) => Ok(i64::from(*i)),
            Variant::UInt(u) => Ok(i64::from(*u)),
            Variant::Double(d) => Ok(d.round() as i64),
            _ => Ok(i64::from(self.as_int()?)),
        }
    }

    /// Zero-copy text view for string kinds, owned elsewhere.
    fn text(&self) -> MResult<String> {
        match self {
            Variant::String(b) => Ok(b.as_str().to_string()),
            Variant::ByteString(b) => Ok(b.as_slice().iter().map(|&c| c as char).collect()),
            _ => Err(MError::software(
                MErrorCode::BadConversion,
                "Could not convert this type to a string",
            )),
        }
    }
}

impl std::fmt::Debug for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Object(None) => write!(f, "Object(null)"),
            Variant::Object(Some(o)) => write!(f, "Object({})", o.class().name),
            Variant::ObjectEmbedded(o) => write!(f, "ObjectEmbedded({})", o.class().name),
            _ => write!(f, "Variant({:?}, {})", self.kind(), self.visualize()),
        }
    }
}

// Scalar and container constructors -------------------------------------

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Bool(v)
    }
}

impl From<u8> for Variant {
    fn from(v: u8) -> Self {
        Variant::Byte(v)
    }
}

impl From<char> for Variant {
    fn from(v: char) -> Self {
        Variant::Char(v)
    }
}

impl From<u32> for Variant {
    fn from(v: u32) -> Self {
        Variant::UInt(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Variant::Int(v)
    }
}

impl From<usize> for Variant {
    fn from(v: usize) -> Self {
        if v <= i32::MAX as usize {
            Variant::Int(v as i32)
        } else {
            Variant::Double(v as f64)
        }
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Variant::Double(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::String(VarBytes::from_slice(v.as_bytes()))
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Variant::String(VarBytes::from_vec(v.into_bytes()))
    }
}

impl From<Vec<String>> for Variant {
    fn from(v: Vec<String>) -> Self {
        Variant::StringCollection(Arc::new(v.into_iter().map(Variant::from).collect()))
    }
}

impl From<Vec<Variant>> for Variant {
    fn from(v: Vec<Variant>) -> Self {
        Variant::Collection(Arc::new(v))
    }
}

// Number parsing shared by the interpretations and the MDL reader --------

pub(crate) fn parse_int(s: &str) -> MResult<i32> {
    let t = s.trim();
    if let Some(hex) = strip_hex_prefix(t) {
        return i64::from_str_radix(hex, 16)
            .ok()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| bad_number(t, "integer"));
    }
    t.parse::<i32>().map_err(|_| bad_number(t, "integer"))
}

pub(crate) fn parse_uint(s: &str) -> MResult<u32> {
    let t = s.trim().trim_end_matches(|c| c == 'u' || c == 'U');
    if let Some(hex) = strip_hex_prefix(t) {
        return u32::from_str_radix(hex, 16).map_err(|_| bad_number(t, "unsigned integer"));
    }
    t.parse::<u32>().map_err(|_| bad_number(t, "unsigned integer"))
}

pub(crate) fn parse_int64(s: &str) -> MResult<i64> {
    let t = s.trim();
    t.parse::<i64>().map_err(|_| bad_number(t, "integer"))
}

pub(crate) fn parse_uint64(s: &str) -> MResult<u64> {
    let t = s.trim();
    t.parse::<u64>().map_err(|_| bad_number(t, "unsigned integer"))
}

pub(crate) fn parse_double(s: &str) -> MResult<f64> {
    let t = s.trim();
    t.parse::<f64>().map_err(|_| bad_number(t, "number"))
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

#[track_caller]
fn bad_number(s: &str, what: &str) -> MError {
    MError::software(
        MErrorCode::BadConversion,
        format!("Could not convert '{}' to {}", crate::error::visualize_str(s), what),
    )
}

/// Double rendering that survives a textual round-trip: always carries a
/// decimal point or exponent.
pub(crate) fn format_double(d: f64) -> String {
    let s = format!("{}", d);
    if s.contains('.') || s.contains('e') || s.contains('E') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.", s)
    }
}
