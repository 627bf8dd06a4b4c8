// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! POSIX-like regular expression engine.
//!
//! A compiled expression returns specific substrings (items) from its
//! input: item 0 is the whole match, items 1..9 the parenthesized groups
//! in order of their opening parentheses. Supported syntax: branches with
//! `|`, pieces with `*`, `+`, `?`, ranges in `[]` (leading `^` negates,
//! `-` spans ASCII), `.`, the anchors `^` and `$`, the word anchors `\<`
//! and `\>`, and backslash escapes of the magic characters.
//!
//! ```
//! use mcore::regexp::Regexp;
//!
//! let mut re = Regexp::compiled("^[\t ]*(.*)[\t ]*\\((.*)\\)", false).unwrap();
//! assert!(re.match_str("example.com!david (David)").unwrap());
//! assert_eq!(re.count().unwrap(), 2);
//! assert_eq!(re.item(1).unwrap(), "example.com!david ");
//! assert_eq!(re.item(2).unwrap(), "David");
//! ```
//!
//! Case-insensitive searches are a compile-time transformation: every
//! top-level letter `c` is rewritten into the range `[Cc]` before the
//! first pass, the matcher itself stays case-sensitive.

mod compile;
mod exec;
mod program;


use crate::error::{MError, MErrorCode, MResult};
use crate::reflect::{MClass, PropertyDef, PropertyGetter, ServiceDef, ServiceMethod};
use crate::variant::{Variant, VariantKind};
use compile::{compile_pattern, SPSTART};
use exec::Executor;
use program::*;

/// How many subexpressions the engine supports; attempting to compile an
/// expression with more generates an error.
pub const NUMBER_OF_SUBEXPRESSIONS: usize = 10;

/// Compiled regular expression with the state of its last match.
#[derive(Debug)]
pub struct Regexp {
    pattern: String,
    program: Option<Vec<u8>>,
    /// Byte that must begin a match, when known.
    regstart: Option<u8>,
    /// Whether the match is anchored at beginning-of-line only.
    reganch: bool,
    /// Longest literal that must appear, as a program range, when the
    /// expression starts with something expensive.
    regmust: Option<(usize, usize)>,
    /// Subject of the last match.
    subject: String,
    startp: [Option<usize>; NUMBER_OF_SUBEXPRESSIONS],
    endp: [Option<usize>; NUMBER_OF_SUBEXPRESSIONS],
    count: usize,
}

impl Default for Regexp {
    fn default() -> Self {
        Self::new()
    }
}

impl Regexp {
    /// An empty, not yet compiled expression.
    pub fn new() -> Self {
        Regexp {
            pattern: String::new(),
            program: None,
            regstart: None,
            reganch: false,
            regmust: None,
            subject: String::new(),
            startp: [None; NUMBER_OF_SUBEXPRESSIONS],
            endp: [None; NUMBER_OF_SUBEXPRESSIONS],
            count: 0,
        }
    }

    /// Compile an expression in one step.
    pub fn compiled(pattern: &str, case_insensitive: bool) -> MResult<Self> {
        let mut re = Regexp::new();
        re.compile(pattern, case_insensitive)?;
        Ok(re)
    }

    pub fn is_compiled(&self) -> bool {
        self.program.is_some()
    }

    pub fn check_is_compiled(&self) -> MResult<()> {
        if self.is_compiled() {
            Ok(())
        } else {
            Err(MError::plain(
                MErrorCode::RegexpIsNotCompiled,
                "Regular expression is not compiled",
            ))
        }
    }

    /// The pattern as it was compiled; case-insensitive compiles store the
    /// folded form.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Clear the expression, reclaiming memory.
    pub fn clear(&mut self) {
        *self = Regexp::new();
    }

    /// Compile the expression, replacing any previous program.
    pub fn compile(&mut self, pattern: &str, case_insensitive: bool) -> MResult<()> {
        self.clear();
        self.pattern = if case_insensitive {
            fold_case(pattern)
        } else {
            pattern.to_string()
        };

        let (code, flags) = compile_pattern(&self.pattern)?;

        // Starting-point info: with only one top-level choice the first
        // atom pins the scan, and an expensive leading * or + earns a
        // must-appear literal check.
        let scan = 1;
        if let Some(next) = next_node(&code, scan) {
            if op(&code, next) == END {
                let mut atom = operand(scan);
                match op(&code, atom) {
                    EXACTLY => self.regstart = Some(code[operand(atom)]),
                    BOL => self.reganch = true,
                    _ => {}
                }
                if flags & SPSTART != 0 {
                    let mut longest: Option<(usize, usize)> = None;
                    loop {
                        if op(&code, atom) == EXACTLY
                            && operand_len(&code, atom) >= longest.map_or(0, |(_, l)| l)
                        {
                            longest = Some((operand(atom), operand_len(&code, atom)));
                        }
                        match next_node(&code, atom) {
                            Some(n) => atom = n,
                            None => break,
                        }
                    }
                    self.regmust = longest;
                }
            }
        }
        self.program = Some(code);
        Ok(())
    }

    /// Examine the string with this expression, updating the item state.
    /// Returns whether there is a match.
    pub fn match_str(&mut self, s: &str) -> MResult<bool> {
        self.check_is_compiled()?;
        self.count = 0;
        self.subject = s.to_string();
        let code = self.program.as_ref().expect("checked compiled");
        let input = self.subject.as_bytes();

        // If there is a "must appear" literal, look for it first.
        if let Some((from, len)) = self.regmust {
            let lit = &code[from..from + len];
            if !contains_subslice(input, lit) {
                return Ok(false);
            }
        }

        let mut executor = Executor::new(code, input);

        let matched = if self.reganch {
            // Anchored match need be tried only once
            executor.try_at(0)
        } else if let Some(start) = self.regstart {
            // We know what byte the match must start with
            let mut found = false;
            for i in 0..input.len() {
                if input[i] == start && executor.try_at(i) {
                    found = true;
                    break;
                }
            }
            found
        } else {
            // General case; try one position after the last too
            let mut found = false;
            for i in 0..=input.len() {
                if executor.try_at(i) {
                    found = true;
                    break;
                }
            }
            found
        };

        if matched {
            self.startp = executor.startp;
            self.endp = executor.endp;
            self.count = executor.count;
        }
        Ok(matched)
    }

    /// One-shot match without keeping a compiled object around.
    pub fn static_match(pattern: &str, s: &str, case_insensitive: bool) -> MResult<bool> {
        let mut re = Regexp::compiled(pattern, case_insensitive)?;
        re.match_str(s)
    }

    /// Number of items found after a successful match.
    pub fn count(&self) -> MResult<usize> {
        self.check_is_compiled()?;
        Ok(self.count)
    }

    /// The i-th matched item; item 0 is the whole match, the last allowed
    /// index equals `count`. Groups that did not participate are empty.
    pub fn item(&self, i: usize) -> MResult<String> {
        let len = self.item_length(i)?;
        let start = self.startp[i].unwrap_or(0);
        Ok(self.subject[start..start + len].to_string())
    }

    /// Starting offset of the i-th item within the matched string.
    pub fn item_start(&self, i: usize) -> MResult<usize> {
        self.check_is_compiled()?;
        MError::check_index_range(0, self.count as i64, i as i64)?;
        Ok(self.startp[i].unwrap_or(0))
    }

    /// Length of the i-th item.
    pub fn item_length(&self, i: usize) -> MResult<usize> {
        self.check_is_compiled()?;
        MError::check_index_range(0, self.count as i64, i as i64)?;
        match (self.startp[i], self.endp[i]) {
            (Some(s), Some(e)) if e > s => Ok(e - s),
            _ => Ok(0),
        }
    }

    /// Build a replacement from a template after a successful match: `&`
    /// is the whole match, `\1` .. `\9` the items, `\\` and `\&` are
    /// literals. References to missing items expand to nothing.
    pub fn replace_string(&self, template: &str) -> MResult<String> {
        self.check_is_compiled()?;
        let mut buf = String::with_capacity(template.len());
        let bytes = template.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            i += 1;
            let no = if c == b'&' {
                Some(0)
            } else if c == b'\\' && i < bytes.len() && bytes[i].is_ascii_digit() {
                let n = (bytes[i] - b'0') as usize;
                i += 1;
                Some(n)
            } else {
                None
            };
            match no {
                None => {
                    // Ordinary character, honoring backslashed '\' and '&'
                    if c == b'\\' && i < bytes.len() && (bytes[i] == b'\\' || bytes[i] == b'&') {
                        buf.push(bytes[i] as char);
                        i += 1;
                    } else {
                        buf.push(c as char);
                    }
                }
                Some(no) => {
                    if let (Some(s), Some(e)) = (self.startp[no], self.endp[no]) {
                        if e > s {
                            buf.push_str(&self.subject[s..e]);
                        }
                    }
                }
            }
        }
        Ok(buf)
    }
}

impl Clone for Regexp {
    /// A clone recompiles the stored pattern; match state is not carried.
    fn clone(&self) -> Self {
        if self.is_compiled() {
            Regexp::compiled(&self.pattern, false).unwrap_or_default()
        } else {
            Regexp::new()
        }
    }
}

/// Rewrite every top-level letter into a `[Cc]` range.
fn fold_case(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut in_range = false;
    for c in pattern.chars() {
        if c == '[' {
            in_range = true;
        }
        if c == ']' {
            in_range = false;
        }
        if !in_range && c.is_ascii_alphabetic() {
            out.push('[');
            out.push(c.to_ascii_uppercase());
            out.push(c.to_ascii_lowercase());
            out.push(']');
        } else {
            out.push(c);
        }
    }
    out
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

// Reflection -------------------------------------------------------------

use crate::reflect::OBJECT_CLASS;

impl crate::reflect::MObject for Regexp {
    fn class(&self) -> &'static MClass {
        &REGEXP_CLASS
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

pub static REGEXP_CLASS: MClass = MClass {
    name: "Regexp",
    type_name: "Regexp",
    parent: Some(&OBJECT_CLASS),
    properties: &[
        PropertyDef::readonly(
            "Count",
            VariantKind::Int,
            PropertyGetter::Object(|o| Ok(Variant::from(o.downcast_ref::<Regexp>()?.count()?))),
        ),
        PropertyDef::readonly(
            "IsCompiled",
            VariantKind::Bool,
            PropertyGetter::Object(|o| {
                Ok(Variant::Bool(o.downcast_ref::<Regexp>()?.is_compiled()))
            }),
        ),
        PropertyDef::readonly(
            "Pattern",
            VariantKind::String,
            PropertyGetter::Object(|o| {
                Ok(Variant::from(o.downcast_ref::<Regexp>()?.pattern()))
            }),
        ),
    ],
    services: &[
        ServiceDef::of(
            "Match",
            ServiceMethod::Mut1(|o, s| {
                let matched = o.downcast_mut::<Regexp>()?.match_str(&s.as_string()?)?;
                Ok(Variant::Bool(matched))
            }),
            "(subject: String) -> Bool",
        ),
        ServiceDef::of(
            "Item",
            ServiceMethod::Const1(|o, i| {
                Ok(Variant::from(
                    o.downcast_ref::<Regexp>()?.item(i.as_uint()? as usize)?,
                ))
            }),
            "(index: Int) -> String",
        ),
        ServiceDef::of(
            "GetItemStart",
            ServiceMethod::Const1(|o, i| {
                Ok(Variant::from(
                    o.downcast_ref::<Regexp>()?.item_start(i.as_uint()? as usize)?,
                ))
            }),
            "(index: Int) -> Int",
        ),
        ServiceDef::of(
            "GetItemLength",
            ServiceMethod::Const1(|o, i| {
                Ok(Variant::from(
                    o.downcast_ref::<Regexp>()?.item_length(i.as_uint()? as usize)?,
                ))
            }),
            "(index: Int) -> Int",
        ),
        ServiceDef::of(
            "GetReplaceString",
            ServiceMethod::Const1(|o, t| {
                Ok(Variant::from(
                    o.downcast_ref::<Regexp>()?.replace_string(&t.as_string()?)?,
                ))
            }),
            "(template: String) -> String",
        ),
        ServiceDef::overloaded(
            "Compile",
            ServiceMethod::Mut2(|o, p, ci| {
                o.downcast_mut::<Regexp>()?
                    .compile(&p.as_string()?, ci.as_bool())?;
                Ok(Variant::Empty)
            }),
            2,
            "(pattern: String, caseInsensitive: Bool)",
        ),
        ServiceDef::overloaded(
            "Compile",
            ServiceMethod::Mut1(|o, p| {
                o.downcast_mut::<Regexp>()?.compile(&p.as_string()?, false)?;
                Ok(Variant::Empty)
            }),
            1,
            "(pattern: String)",
        ),
        ServiceDef::of(
            "Clear",
            ServiceMethod::Mut0(|o| {
                o.downcast_mut::<Regexp>()?.clear();
                Ok(Variant::Empty)
            }),
            "()",
        ),
        ServiceDef::of(
            "CheckIsCompiled",
            ServiceMethod::Const0(|o| {
                o.downcast_ref::<Regexp>()?.check_is_compiled()?;
                Ok(Variant::Empty)
            }),
            "()",
        ),
        ServiceDef::overloaded(
            "StaticMatch",
            ServiceMethod::Class2(|p, s| {
                Ok(Variant::Bool(Regexp::static_match(
                    &p.as_string()?,
                    &s.as_string()?,
                    false,
                )?))
            }),
            2,
            "(pattern: String, subject: String) -> Bool",
        ),
        ServiceDef::overloaded(
            "StaticMatch",
            ServiceMethod::Class3(|p, s, ci| {
                Ok(Variant::Bool(Regexp::static_match(
                    &p.as_string()?,
                    &s.as_string()?,
                    ci.as_bool(),
                )?))
            }),
            3,
            "(pattern: String, subject: String, caseInsensitive: Bool) -> Bool",
        ),
        ServiceDef::overloaded(
            "New",
            ServiceMethod::Class0(|| {
                Ok(Variant::from_object(std::sync::Arc::new(Regexp::new())))
            }),
            0,
            "() -> Regexp",
        ),
        ServiceDef::overloaded(
            "New",
            ServiceMethod::Class1(|p| {
                Ok(Variant::from_object(std::sync::Arc::new(Regexp::compiled(
                    &p.as_string()?,
                    false,
                )?)))
            }),
            1,
            "(pattern: String) -> Regexp",
        ),
        ServiceDef::overloaded(
            "New",
            ServiceMethod::Class2(|p, ci| {
                Ok(Variant::from_object(std::sync::Arc::new(Regexp::compiled(
                    &p.as_string()?,
                    ci.as_bool(),
                )?)))
            }),
            2,
            "(pattern: String, caseInsensitive: Bool) -> Regexp",
        ),
    ],
};
