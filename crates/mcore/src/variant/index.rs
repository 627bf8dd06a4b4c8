// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Item access, slicing, and map entry manipulation.
//!
//! Indices may be negative and count from the end; the valid range is
//! `[-count, count - 1]`. Slices are Pythonic: from-inclusive,
//! to-exclusive, clamped, empty when reversed. Map updates scan from the
//! tail so the newest duplicate key wins.

use super::{VarBytes, Variant};
use crate::error::{MError, MErrorCode, MResult};

impl Variant {
    /// Normalize a possibly negative index against `count`.
    pub fn adjust_index(index: i32, count: usize) -> MResult<usize> {
        let signed = count as i32;
        MError::check_index_range(-i64::from(signed), i64::from(signed) - 1, i64::from(index))?;
        if index < 0 {
            Ok((index + signed) as usize)
        } else {
            Ok(index as usize)
        }
    }

    /// Normalize a slice, returning `(from, size)`.
    pub fn adjust_slice(from: i32, to: i32, count: usize) -> (usize, usize) {
        let length = count as i32;
        let mut from = from;
        let mut to = to;
        if from < 0 {
            from += length;
        }
        from = from.clamp(0, length);
        if to < 0 {
            to += length;
        }
        if to > length {
            to = length;
        }
        if to < from {
            return (from as usize, 0);
        }
        (from as usize, (to - from) as usize)
    }

    /// Item by generic key: maps look the key up, objects dispatch their
    /// reflected `Item` service, everything else indexes numerically.
    pub fn get_item(&self, index: &Variant) -> MResult<Variant> {
        if self.is_object() {
            return self.as_existing_object()?.as_ref().call1_const("Item", index);
        }
        if matches!(self, Variant::Map(_)) {
            return self.map_lookup(index)?.cloned().ok_or_else(|| entry_not_found(index));
        }
        self.get_item_at(index.as_int()?)
    }

    /// Item by numeric index.
    pub fn get_item_at(&self, index: i32) -> MResult<Variant> {
        match self {
            Variant::ByteString(b) => {
                let i = Self::adjust_index(index, b.len())?;
                Ok(Variant::Byte(b.as_slice()[i]))
            }
            Variant::String(b) => {
                let s = b.as_str();
                let i = Self::adjust_index(index, s.chars().count())?;
                Ok(Variant::Char(s.chars().nth(i).unwrap_or('\0')))
            }
            Variant::StringCollection(v) | Variant::Collection(v) => {
                let i = Self::adjust_index(index, v.len())?;
                Ok(v[i].clone())
            }
            Variant::Map(_) => self.get_item(&Variant::Int(index)),
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Store an item. For maps the newest matching key is replaced in
    /// place, otherwise a new pair is appended.
    pub fn set_item(&mut self, index: &Variant, value: &Variant) -> MResult<()> {
        match self {
            Variant::Map(_) => {
                let stored = self.elements()?;
                let mut at = None;
                let mut i = stored.len();
                while i >= 2 {
                    i -= 2;
                    if stored[i].try_eq(index)? {
                        at = Some(i + 1);
                        break;
                    }
                }
                let items = self.elements_mut()?;
                match at {
                    Some(slot) => items[slot] = value.clone(),
                    None => {
                        items.push(index.clone());
                        items.push(value.clone());
                    }
                }
                Ok(())
            }
            _ => self.set_item_at(index.as_int()?, value),
        }
    }

    /// Store an item by numeric index.
    pub fn set_item_at(&mut self, index: i32, value: &Variant) -> MResult<()> {
        match self {
            Variant::ByteString(_) | Variant::String(_) => {
                let byte = value.as_byte()?;
                match self {
                    Variant::ByteString(b) => {
                        let i = Self::adjust_index(index, b.len())?;
                        b.make_mut()[i] = byte;
                    }
                    Variant::String(b) => {
                        let chars: Vec<char> = b.as_str().chars().collect();
                        let i = Self::adjust_index(index, chars.len())?;
                        let mut s: String = chars[..i].iter().collect();
                        s.push(byte as char);
                        s.extend(&chars[i + 1..]);
                        *b = VarBytes::from_vec(s.into_bytes());
                    }
                    _ => unreachable!(),
                }
                Ok(())
            }
            Variant::StringCollection(v) | Variant::Collection(v) => {
                let i = Self::adjust_index(index, v.len())?;
                self.elements_mut()?[i] = value.clone();
                Ok(())
            }
            Variant::Map(_) => self.set_item(&Variant::Int(index), value),
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Read-only item access; a missing map key fails `EntryNotFound`.
    pub fn access_item(&self, index: &Variant) -> MResult<&Variant> {
        if matches!(self, Variant::Map(_)) {
            return self.map_lookup(index)?.ok_or_else(|| entry_not_found(index));
        }
        let i = index.as_int()?;
        match self {
            Variant::StringCollection(v) | Variant::Collection(v) => {
                let i = Self::adjust_index(i, v.len())?;
                Ok(&v[i])
            }
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Mutable item access. On a map, a missing key creates the pair and
    /// returns the freshly Empty value; this is the observable difference
    /// from [`Variant::get_item`].
    pub fn access_item_mut(&mut self, index: &Variant) -> MResult<&mut Variant> {
        if matches!(self, Variant::Map(_)) {
            let stored = self.elements()?;
            let mut at = None;
            let mut i = stored.len();
            while i >= 2 {
                i -= 2;
                if stored[i].try_eq(index)? {
                    at = Some(i + 1);
                    break;
                }
            }
            let items = self.elements_mut()?;
            let slot = match at {
                Some(slot) => slot,
                None => {
                    items.push(index.clone());
                    items.push(Variant::Empty);
                    items.len() - 1
                }
            };
            return Ok(&mut items[slot]);
        }
        let i = index.as_int()?;
        match self {
            Variant::StringCollection(v) | Variant::Collection(v) => {
                let i = Self::adjust_index(i, v.len())?;
                Ok(&mut self.elements_mut()?[i])
            }
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Exchange two items of an indexed value.
    pub fn swap_items(&mut self, index1: i32, index2: i32) -> MResult<()> {
        match self {
            Variant::ByteString(b) => {
                let i1 = Self::adjust_index(index1, b.len())?;
                let i2 = Self::adjust_index(index2, b.len())?;
                b.make_mut().swap(i1, i2);
                Ok(())
            }
            Variant::String(b) => {
                let mut chars: Vec<char> = b.as_str().chars().collect();
                let i1 = Self::adjust_index(index1, chars.len())?;
                let i2 = Self::adjust_index(index2, chars.len())?;
                chars.swap(i1, i2);
                *b = VarBytes::from_vec(chars.into_iter().collect::<String>().into_bytes());
                Ok(())
            }
            Variant::StringCollection(v) | Variant::Collection(v) => {
                let i1 = Self::adjust_index(index1, v.len())?;
                let i2 = Self::adjust_index(index2, v.len())?;
                if i1 != i2 {
                    self.elements_mut()?.swap(i1, i2);
                }
                Ok(())
            }
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Pythonic slice copy.
    pub fn get_slice(&self, from: i32, to: i32) -> MResult<Variant> {
        match self {
            Variant::ByteString(b) => {
                let (from, size) = Self::adjust_slice(from, to, b.len());
                Ok(Variant::byte_string(&b.as_slice()[from..from + size]))
            }
            Variant::String(b) => {
                let chars: Vec<char> = b.as_str().chars().collect();
                let (from, size) = Self::adjust_slice(from, to, chars.len());
                Ok(Variant::from(
                    chars[from..from + size].iter().collect::<String>(),
                ))
            }
            Variant::StringCollection(v) | Variant::Collection(v) => {
                let (from, size) = Self::adjust_slice(from, to, v.len());
                let slice = v[from..from + size].to_vec();
                Ok(match self {
                    Variant::StringCollection(_) => {
                        Variant::StringCollection(std::sync::Arc::new(slice))
                    }
                    _ => Variant::Collection(std::sync::Arc::new(slice)),
                })
            }
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Replace a slice: Empty removes, a collection splices element-wise,
    /// an indexed value splices its bytes, a scalar replaces with one item.
    pub fn set_slice(&mut self, from: i32, to: i32, values: &Variant) -> MResult<()> {
        match self {
            Variant::ByteString(b) | Variant::String(b) => {
                let (from, size) = Self::adjust_slice(from, to, b.len());
                let insert: Vec<u8> = if values.is_empty() {
                    Vec::new()
                } else if values.is_indexed() {
                    values.as_byte_string()?
                } else {
                    vec![values.as_byte()?]
                };
                b.replace_range(from, size, &insert);
                Ok(())
            }
            Variant::StringCollection(v) | Variant::Collection(v) => {
                let (from, size) = Self::adjust_slice(from, to, v.len());
                let insert: Vec<Variant> = if values.is_empty() {
                    Vec::new()
                } else if values.is_collection() {
                    values.as_variant_collection()?
                } else {
                    vec![values.clone()]
                };
                self.elements_mut()?.splice(from..from + size, insert);
                Ok(())
            }
            _ => Err(MError::cannot_index_item(&self.visualize())),
        }
    }

    /// Append one element to a collection.
    pub fn add_to_collection(&mut self, v: Variant) -> MResult<()> {
        match self {
            Variant::StringCollection(_) | Variant::Collection(_) => {
                self.elements_mut()?.push(v);
                Ok(())
            }
            _ => Err(MError::not_supported_for_this_type()),
        }
    }

    /// Index of the first (or last, with `reverse`) matching item; `-1`
    /// when absent. On maps this searches keys; on strings, substrings.
    pub fn find_index_of(&self, v: &Variant, reverse: bool) -> MResult<i32> {
        if !self.is_indexed() {
            return Err(MError::cannot_index_item(&self.visualize()));
        }
        if let Variant::Map(items) = self {
            let mut i = items.len();
            while i >= 2 {
                i -= 2;
                if items[i].try_eq(v)? {
                    return Ok((i / 2) as i32);
                }
            }
            return Ok(-1);
        }
        if self.is_collection() {
            let items = self.elements()?;
            if reverse {
                for (i, item) in items.iter().enumerate().rev() {
                    if item.try_eq(v)? {
                        return Ok(i as i32);
                    }
                }
            } else {
                for (i, item) in items.iter().enumerate() {
                    if item.try_eq(v)? {
                        return Ok(i as i32);
                    }
                }
            }
            return Ok(-1);
        }
        // Substring search in strings and byte strings
        let hay = self.as_byte_string()?;
        let needle = v.as_byte_string()?;
        if needle.is_empty() {
            // An empty string is always present
            return Ok(if reverse { hay.len() as i32 } else { 0 });
        }
        let positions = hay.windows(needle.len()).enumerate();
        let found = if reverse {
            positions.filter(|(_, w)| *w == needle.as_slice()).last()
        } else {
            positions.filter(|(_, w)| *w == needle.as_slice()).next()
        };
        Ok(found.map_or(-1, |(i, _)| i as i32))
    }

    /// Containment test (the `IN` operation): every element of a
    /// collection parameter must be present; map parameters test keys.
    pub fn is_present(&self, v: &Variant) -> MResult<bool> {
        if v.is_collection() {
            if let Variant::Map(items) = v {
                for pair in items.chunks_exact(2) {
                    if !self.is_present(&pair[0])? {
                        return Ok(false);
                    }
                }
            } else {
                for item in v.elements()? {
                    if !self.is_present(item)? {
                        return Ok(false);
                    }
                }
            }
            return Ok(true);
        }
        if self.is_indexed() {
            return Ok(self.find_index_of(v, false)? >= 0);
        }
        v.try_eq(self)
    }

    // Map views ---------------------------------------------------------

    pub fn get_map_key_by_index(&self, i: usize) -> MResult<&Variant> {
        self.map_pair(i, 0)
    }

    pub fn get_map_value_by_index(&self, i: usize) -> MResult<&Variant> {
        self.map_pair(i, 1)
    }

    /// All keys, in insertion order.
    pub fn get_all_map_keys(&self) -> MResult<Variant> {
        self.map_halves(0)
    }

    /// All values, in insertion order.
    pub fn get_all_map_values(&self) -> MResult<Variant> {
        self.map_halves(1)
    }

    fn map_halves(&self, offset: usize) -> MResult<Variant> {
        match self {
            Variant::Map(items) => Ok(Variant::Collection(std::sync::Arc::new(
                items.iter().skip(offset).step_by(2).cloned().collect(),
            ))),
            _ => Err(MError::not_supported_for_this_type()),
        }
    }

    fn map_pair(&self, i: usize, offset: usize) -> MResult<&Variant> {
        match self {
            Variant::Map(items) => {
                let at = i * 2 + offset;
                if at >= items.len() {
                    return Err(MError::software(
                        MErrorCode::IndexOutOfRange,
                        format!("Index {} is out of range 0 .. {}", i, items.len() / 2),
                    ));
                }
                Ok(&items[at])
            }
            _ => Err(MError::not_supported_for_this_type()),
        }
    }

    /// Newest-wins key lookup shared by the map readers.
    fn map_lookup(&self, key: &Variant) -> MResult<Option<&Variant>> {
        let items = self.elements()?;
        let mut i = items.len();
        while i >= 2 {
            i -= 2;
            if items[i].try_eq(key)? {
                return Ok(Some(&items[i + 1]));
            }
        }
        Ok(None)
    }
}

#[track_caller]
fn entry_not_found(key: &Variant) -> MError {
    MError::software(
        MErrorCode::EntryNotFound,
        format!("Entry '{}' not found in the map", key.visualize()),
    )
}
