// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Arithmetic, logical, and comparison operations over variants.
//!
//! Binary operations pick the larger operand kind by promotion order and
//! the result keeps the narrowest integer kind that losslessly represents
//! the value, falling back to Double. Boolean operands are rejected for
//! arithmetic. Strings concatenate, collections extend, maps merge
//! right-to-left, objects dispatch to their reflected `Add` / `Subtract` /
//! `Multiply` / `Divide` / `Compare` services.

use super::{Variant, VariantKind};
use crate::error::{MError, MErrorCode, MResult};
use std::sync::Arc;

/// Choose the result kind for a numeric operation: the narrowest integer
/// by promotion rank that holds `result` without loss, else Double.
fn do_return_typed(result: f64, k1: VariantKind, k2: VariantKind) -> MResult<Variant> {
    if k1 == VariantKind::Bool || k2 == VariantKind::Bool {
        return Err(MError::not_supported_for_this_type());
    }
    let max = k1.max(k2);
    if result.fract() == 0.0 {
        match max {
            VariantKind::Byte => {
                if (0.0..=255.0).contains(&result) {
                    return Ok(Variant::Byte(result as u8));
                }
            }
            VariantKind::Char => {
                if (-128.0..=255.0).contains(&result) {
                    return Ok(Variant::Char((result as i32 as u8) as char));
                }
            }
            VariantKind::UInt => {
                if result >= 0.0 && result <= f64::from(u32::MAX) {
                    return Ok(Variant::UInt(result as u32));
                }
            }
            VariantKind::Int => {
                if result >= f64::from(i32::MIN) && result <= f64::from(i32::MAX) {
                    return Ok(Variant::Int(result as i32));
                }
            }
            _ => {}
        }
        // Integer operands whose result escapes the integer range widen:
        // Byte and Char spill into UInt or Int before Double.
        if max < VariantKind::UInt {
            if result >= 0.0 && result <= f64::from(u32::MAX) {
                return Ok(Variant::UInt(result as u32));
            }
            if result >= f64::from(i32::MIN) && result < 0.0 {
                return Ok(Variant::Int(result as i32));
            }
        }
    }
    Ok(Variant::Double(result))
}

/// 32-bit bit-pattern interpretation used by the bitwise operators.
impl Variant {
    pub fn as_dword(&self) -> MResult<u32> {
        match self {
            Variant::Bool(b) => Ok(u32::from(*b)),
            Variant::Byte(b) => Ok(u32::from(*b)),
            Variant::Char(c) => Ok(*c as u32),
            Variant::UInt(u) => Ok(*u),
            Variant::Int(i) => Ok(*i as u32),
            Variant::Double(d) => {
                let val = d.round();
                MError::check_double_range(f64::from(i32::MIN), f64::from(u32::MAX), val)?;
                if val < 0.0 {
                    Ok(val as i32 as u32)
                } else {
                    Ok(val as u32)
                }
            }
            Variant::ByteString(_) | Variant::String(_) => {
                let s = self.as_string()?;
                if s.trim_start().starts_with('-') {
                    Ok(super::parse_int(&s)? as u32)
                } else {
                    super::parse_uint(&s)
                }
            }
            Variant::Empty => Err(MError::no_value()),
            _ => self
                .client_value("Could not convert variant containing object reference to a numeric value")?
                .as_dword(),
        }
    }

    // Binary arithmetic -------------------------------------------------

    pub fn add(&self, v: &Variant) -> MResult<Variant> {
        match self.kind().max(v.kind()) {
            VariantKind::ByteString => {
                let mut bytes = self.as_byte_string()?;
                bytes.extend_from_slice(&v.as_byte_string()?);
                Ok(Variant::byte_string(bytes))
            }
            VariantKind::String => {
                let mut s = self.as_string()?;
                s.push_str(&v.as_string()?);
                Ok(Variant::from(s))
            }
            VariantKind::StringCollection | VariantKind::VariantCollection => {
                let (base, extra) = if self.is_collection() { (self, v) } else { (v, self) };
                let mut result = base.clone();
                result.add_assign(extra)?;
                Ok(result)
            }
            VariantKind::Map => {
                let (base, extra) = if matches!(self, Variant::Map(_)) { (self, v) } else { (v, self) };
                let mut result = base.clone();
                result.add_assign(extra)?;
                Ok(result)
            }
            VariantKind::Object | VariantKind::ObjectEmbedded => {
                if self.is_object() {
                    self.as_existing_object()?.as_ref().call1_const("Add", v)
                } else {
                    v.as_existing_object()?.as_ref().call1_const("Add", self)
                }
            }
            _ => do_return_typed(self.as_double()? + v.as_double()?, self.kind(), v.kind()),
        }
    }

    pub fn add_assign(&mut self, v: &Variant) -> MResult<()> {
        match self {
            Variant::String(b) | Variant::ByteString(b) => {
                if v.is_numeric() {
                    b.push(v.as_byte()?);
                } else {
                    b.extend_from_slice(&v.as_byte_string()?);
                }
                Ok(())
            }
            Variant::StringCollection(_) | Variant::Collection(_) => {
                if v.is_collection() {
                    let extra = v.as_variant_collection()?;
                    self.elements_mut()?.extend(extra);
                } else {
                    self.elements_mut()?.push(v.clone());
                }
                Ok(())
            }
            Variant::Map(_) => match v {
                Variant::Map(pairs) => {
                    let pairs = pairs.clone();
                    for pair in pairs.chunks_exact(2) {
                        self.set_item(&pair[0], &pair[1])?;
                    }
                    Ok(())
                }
                Variant::StringCollection(items) | Variant::Collection(items) if items.len() == 2 => {
                    let (k, val) = (items[0].clone(), items[1].clone());
                    self.set_item(&k, &val)
                }
                _ => Err(MError::software(
                    MErrorCode::CannotIndexItem,
                    "Cannot add item of this type to the map",
                )),
            },
            _ => {
                *self = self.add(v)?;
                Ok(())
            }
        }
    }

    pub fn subtract(&self, v: &Variant) -> MResult<Variant> {
        if self.is_object() {
            return self.as_existing_object()?.as_ref().call1_const("Subtract", v);
        }
        if matches!(self, Variant::Map(_)) {
            let mut result = self.clone();
            result.subtract_assign(v)?;
            return Ok(result);
        }
        if matches!(v, Variant::Map(_)) {
            let mut result = v.clone();
            result.subtract_assign(self)?;
            return Ok(result);
        }
        do_return_typed(self.as_double()? - v.as_double()?, self.kind(), v.kind())
    }

    pub fn subtract_assign(&mut self, v: &Variant) -> MResult<()> {
        match self {
            Variant::StringCollection(_) | Variant::Collection(_) => {
                // All matching occurrences are removed from arrays.
                let items = self.elements()?;
                let mut keep = Vec::with_capacity(items.len());
                for item in items.iter() {
                    if !item.try_eq(v)? {
                        keep.push(item.clone());
                    }
                }
                *self.elements_mut()? = keep;
                Ok(())
            }
            Variant::Map(_) => {
                if let Variant::Map(pairs) = v {
                    let keys: Vec<Variant> = pairs.chunks_exact(2).map(|p| p[0].clone()).collect();
                    for key in keys {
                        self.subtract_assign(&key)?;
                    }
                    return Ok(());
                }
                // One pair is removed, the newest matching key first.
                let stored = self.elements()?;
                let mut found = None;
                let mut i = stored.len();
                while i >= 2 {
                    i -= 2;
                    if stored[i].try_eq(v)? {
                        found = Some(i);
                        break;
                    }
                }
                if let Some(at) = found {
                    let items = self.elements_mut()?;
                    items.drain(at..at + 2);
                }
                Ok(())
            }
            _ => {
                *self = self.subtract(v)?;
                Ok(())
            }
        }
    }

    pub fn multiply(&self, v: &Variant) -> MResult<Variant> {
        match self.kind().max(v.kind()) {
            VariantKind::String | VariantKind::ByteString => {
                let (text, num) = if matches!(self, Variant::String(_) | Variant::ByteString(_)) {
                    (self, v.as_uint()?)
                } else {
                    (v, self.as_uint()?)
                };
                let unit = text.as_byte_string()?;
                let mut bytes = Vec::with_capacity(unit.len() * num as usize);
                for _ in 0..num {
                    bytes.extend_from_slice(&unit);
                }
                if matches!(text, Variant::String(_)) {
                    Ok(Variant::String(super::VarBytes::from_vec(bytes)))
                } else {
                    Ok(Variant::byte_string(bytes))
                }
            }
            VariantKind::Object | VariantKind::ObjectEmbedded => {
                if self.is_object() {
                    self.as_existing_object()?.as_ref().call1_const("Multiply", v)
                } else {
                    v.as_existing_object()?.as_ref().call1_const("Multiply", self)
                }
            }
            _ => do_return_typed(self.as_double()? * v.as_double()?, self.kind(), v.kind()),
        }
    }

    pub fn divide(&self, v: &Variant) -> MResult<Variant> {
        if self.is_object() {
            return self.as_existing_object()?.as_ref().call1_const("Divide", v);
        }
        let divisor = v.as_double()?;
        if divisor == 0.0 {
            return Err(MError::division_by_zero());
        }
        do_return_typed(self.as_double()? / divisor, self.kind(), v.kind())
    }

    pub fn modulo(&self, v: &Variant) -> MResult<Variant> {
        if matches!(self, Variant::Bool(_)) || matches!(v, Variant::Bool(_)) {
            return Err(MError::not_supported_for_this_type());
        }
        if matches!(self, Variant::Double(_)) || matches!(v, Variant::Double(_)) {
            let divisor = v.as_double()?;
            if divisor == 0.0 {
                return Err(MError::division_by_zero());
            }
            return Ok(Variant::Double(self.as_double()? % divisor));
        }
        let divisor = v.as_int()?;
        if divisor == 0 {
            return Err(MError::division_by_zero());
        }
        if matches!(self, Variant::UInt(_) | Variant::Byte(_)) {
            Ok(Variant::UInt(self.as_uint()? % divisor as u32))
        } else {
            Ok(Variant::Int(self.as_int()? % divisor))
        }
    }

    pub fn shift_left(&self, v: &Variant) -> MResult<Variant> {
        let by = v.as_int()? as u32;
        if matches!(self, Variant::UInt(_) | Variant::Byte(_)) {
            Ok(Variant::UInt(self.as_uint()?.wrapping_shl(by)))
        } else {
            Ok(Variant::Int(self.as_int()?.wrapping_shl(by)))
        }
    }

    pub fn shift_right(&self, v: &Variant) -> MResult<Variant> {
        let by = v.as_int()? as u32;
        if matches!(self, Variant::UInt(_) | Variant::Byte(_)) {
            Ok(Variant::UInt(self.as_uint()?.wrapping_shr(by)))
        } else {
            Ok(Variant::Int(self.as_int()?.wrapping_shr(by)))
        }
    }

    // Bitwise and logical -----------------------------------------------

    pub fn bit_or(&self, v: &Variant) -> MResult<Variant> {
        self.bitwise(v, BitOp::Or)
    }

    pub fn bit_and(&self, v: &Variant) -> MResult<Variant> {
        self.bitwise(v, BitOp::And)
    }

    pub fn bit_xor(&self, v: &Variant) -> MResult<Variant> {
        self.bitwise(v, BitOp::Xor)
    }

    fn bitwise(&self, v: &Variant, op: BitOp) -> MResult<Variant> {
        match self.kind().max(v.kind()) {
            VariantKind::Bool | VariantKind::Object | VariantKind::ObjectEmbedded => {
                let (a, b) = (self.as_bool(), v.as_bool());
                Ok(Variant::Bool(match op {
                    BitOp::Or => a || b,
                    BitOp::And => a && b,
                    BitOp::Xor => a != b,
                }))
            }
            VariantKind::Byte => Ok(Variant::Byte(op.eval8(self.as_byte()?, v.as_byte()?))),
            VariantKind::Char => Ok(Variant::Char(
                op.eval8(self.as_char()? as u8, v.as_char()? as u8) as char,
            )),
            VariantKind::ByteString => {
                let a = self.as_byte_string()?;
                let b = v.as_byte_string()?;
                if a.len() != b.len() {
                    return Err(MError::software(
                        MErrorCode::SizesDiffer,
                        format!("Sizes of items are different, {} and {}", a.len(), b.len()),
                    ));
                }
                let bytes: Vec<u8> = a.iter().zip(b.iter()).map(|(&x, &y)| op.eval8(x, y)).collect();
                Ok(Variant::byte_string(bytes))
            }
            VariantKind::Int => Ok(Variant::Int(op.eval32(self.as_dword()?, v.as_dword()?) as i32)),
            _ => Ok(Variant::UInt(op.eval32(self.as_dword()?, v.as_dword()?))),
        }
    }

    /// Logical not for Bool and objects, bitwise complement for integers;
    /// Empty reads as true by convention.
    pub fn not(&self) -> MResult<Variant> {
        match self {
            Variant::Empty => Ok(Variant::Bool(true)),
            Variant::Bool(_) | Variant::Object(_) | Variant::ObjectEmbedded(_) => {
                Ok(Variant::Bool(!self.as_bool()))
            }
            Variant::Int(_) => Ok(Variant::Int(!self.as_dword()? as i32)),
            Variant::Byte(b) => Ok(Variant::Byte(!b)),
            Variant::Char(c) => Ok(Variant::Char((!(*c as u8)) as char)),
            _ => Ok(Variant::UInt(!self.as_dword()?)),
        }
    }

    pub fn negate(&self) -> MResult<Variant> {
        match self {
            Variant::UInt(u) => {
                if *u > i32::MAX as u32 {
                    Ok(Variant::Double(-f64::from(*u)))
                } else {
                    Ok(Variant::Int(-(*u as i32)))
                }
            }
            Variant::Int(i) => {
                if *i == i32::MIN {
                    Ok(Variant::Double(-f64::from(*i)))
                } else {
                    Ok(Variant::Int(-i))
                }
            }
            Variant::Double(d) => Ok(Variant::Double(-d)),
            _ => match self.as_int() {
                Ok(i) => Ok(Variant::Int(-i)),
                Err(_) => Ok(Variant::Double(-self.as_double()?)),
            },
        }
    }

    /// In-place `++` with overflow detection per kind.
    pub fn increment(&mut self) -> MResult<()> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::Bool(b) => {
                if *b {
                    return Err(overflow("++"));
                }
                *b = true;
                Ok(())
            }
            Variant::Byte(b) => {
                *b = b.checked_add(1).ok_or_else(|| overflow("++"))?;
                Ok(())
            }
            Variant::Char(c) => {
                let v = *c as u32;
                if v >= CHAR_NUMERIC_MAX {
                    return Err(overflow("++"));
                }
                *c = char::from_u32(v + 1).ok_or_else(|| overflow("++"))?;
                Ok(())
            }
            Variant::Int(i) => {
                *i = i.checked_add(1).ok_or_else(|| overflow("++"))?;
                Ok(())
            }
            Variant::UInt(u) => {
                *u = u.checked_add(1).ok_or_else(|| overflow("++"))?;
                Ok(())
            }
            Variant::Double(d) => {
                *d += 1.0;
                Ok(())
            }
            _ => Err(MError::not_supported_for_this_type()),
        }
    }

    /// In-place `--` with underflow detection per kind.
    pub fn decrement(&mut self) -> MResult<()> {
        match self {
            Variant::Empty => Err(MError::no_value()),
            Variant::Bool(b) => {
                if !*b {
                    return Err(underflow("--"));
                }
                *b = false;
                Ok(())
            }
            Variant::Byte(b) => {
                *b = b.checked_sub(1).ok_or_else(|| underflow("--"))?;
                Ok(())
            }
            Variant::Char(c) => {
                let v = *c as u32;
                if v == 0 {
                    return Err(underflow("--"));
                }
                *c = char::from_u32(v - 1).ok_or_else(|| underflow("--"))?;
                Ok(())
            }
            Variant::Int(i) => {
                *i = i.checked_sub(1).ok_or_else(|| underflow("--"))?;
                Ok(())
            }
            Variant::UInt(u) => {
                *u = u.checked_sub(1).ok_or_else(|| underflow("--"))?;
                Ok(())
            }
            Variant::Double(d) => {
                *d -= 1.0;
                Ok(())
            }
            _ => Err(MError::not_supported_for_this_type()),
        }
    }

    // Comparison --------------------------------------------------------

    /// Equality with the promotion rules of the model. Empty equals Empty
    /// and the null object; objects compare via their reflected `Compare`
    /// service, and are unequal without one unless pointer-identical.
    pub fn try_eq(&self, v: &Variant) -> MResult<bool> {
        match self.kind().max(v.kind()) {
            VariantKind::Empty => Ok(true),
            VariantKind::Bool => Ok(self.as_bool() == v.as_bool()),
            VariantKind::Byte
            | VariantKind::Char
            | VariantKind::UInt
            | VariantKind::Int
            | VariantKind::Double => Ok(self.as_double()? == v.as_double()?),
            VariantKind::Map => {
                if self.kind() != v.kind() {
                    return Ok(false);
                }
                self.eq_elementwise(v)
            }
            VariantKind::StringCollection | VariantKind::VariantCollection => self.eq_elementwise(v),
            VariantKind::Object | VariantKind::ObjectEmbedded => {
                Ok(compare_objects(self, v, true)? == 0)
            }
            _ => {
                if self.kind() == v.kind() {
                    Ok(self.as_byte_string()? == v.as_byte_string()?)
                } else {
                    Ok(self.as_string()? == v.as_string()?)
                }
            }
        }
    }

    fn eq_elementwise(&self, v: &Variant) -> MResult<bool> {
        if !self.is_collection() || !v.is_collection() {
            return Ok(false);
        }
        let a = self.elements()?;
        let b = v.elements()?;
        if a.len() != b.len() {
            return Ok(false);
        }
        for (x, y) in a.iter().zip(b.iter()) {
            if !x.try_eq(y)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn try_lt(&self, v: &Variant) -> MResult<bool> {
        match self.kind().max(v.kind()) {
            VariantKind::Bool => Ok(!self.as_bool() && v.as_bool()),
            VariantKind::Byte
            | VariantKind::Char
            | VariantKind::UInt
            | VariantKind::Int
            | VariantKind::Double => Ok(self.as_double()? < v.as_double()?),
            VariantKind::Object | VariantKind::ObjectEmbedded => {
                Ok(compare_objects(self, v, false)? < 0)
            }
            VariantKind::StringCollection | VariantKind::VariantCollection | VariantKind::Map => {
                vector_less(&self.as_variant_collection()?, &v.as_variant_collection()?)
            }
            _ => Ok(self.as_string()? < v.as_string()?),
        }
    }

    pub fn try_gt(&self, v: &Variant) -> MResult<bool> {
        v.try_lt(self)
    }

    pub fn try_le(&self, v: &Variant) -> MResult<bool> {
        Ok(!self.try_gt(v)?)
    }

    pub fn try_ge(&self, v: &Variant) -> MResult<bool> {
        Ok(!self.try_lt(v)?)
    }
}

/// Equality that swallows conversion failures; map keys and tests use the
/// fallible [`Variant::try_eq`] directly.
impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

const CHAR_NUMERIC_MAX: u32 = 255;

#[derive(Clone, Copy)]
enum BitOp {
    Or,
    And,
    Xor,
}

impl BitOp {
    fn eval8(self, a: u8, b: u8) -> u8 {
        match self {
            BitOp::Or => a | b,
            BitOp::And => a & b,
            BitOp::Xor => a ^ b,
        }
    }

    fn eval32(self, a: u32, b: u32) -> u32 {
        match self {
            BitOp::Or => a | b,
            BitOp::And => a & b,
            BitOp::Xor => a ^ b,
        }
    }
}

#[track_caller]
fn overflow(op: &str) -> MError {
    MError::software(MErrorCode::Overflow, format!("Overflow in operation '{}'", op))
}

#[track_caller]
fn underflow(op: &str) -> MError {
    MError::software(MErrorCode::Underflow, format!("Underflow in operation '{}'", op))
}

fn vector_less(a: &[Variant], b: &[Variant]) -> MResult<bool> {
    for (x, y) in a.iter().zip(b.iter()) {
        if x.try_lt(y)? {
            return Ok(true);
        }
        if x.try_gt(y)? {
            return Ok(false);
        }
    }
    Ok(a.len() < b.len())
}

/// Three-way object comparison honoring the reflected `Compare` service.
/// With `equality` set, a missing `Compare` means "unequal" instead of an
/// error; null objects equal Empty and sort below every other value.
fn compare_objects(v1: &Variant, v2: &Variant, equality: bool) -> MResult<i32> {
    if v1.is_object() {
        if let Some(o1) = v1.as_object()? {
            if let Ok(Some(o2)) = v2.as_object() {
                if Arc::ptr_eq(o1, o2) {
                    return Ok(0);
                }
            }
            if equality && !o1.as_ref().is_service_present("Compare") {
                return Ok(1); // not equal
            }
            return o1.as_ref().call1_const("Compare", v2)?.as_int();
        }
        // v1 is a null object
        if v2.is_empty() {
            return Ok(0);
        }
        if !v2.is_object() {
            return Ok(-1);
        }
    }
    if v2.is_object() {
        if let Some(o2) = v2.as_object()? {
            if equality && !o2.as_ref().is_service_present("Compare") {
                return Ok(1);
            }
            return Ok(-(o2.as_ref().call1_const("Compare", v1)?.as_int()?));
        }
        if v1.is_empty() {
            return Ok(0);
        }
        if !v1.is_object() {
            return Ok(1);
        }
    }
    Ok(0) // both null objects
}
