// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Two-pass regular expression compiler.
//!
//! The first pass walks the pattern with a sizing sink, validating syntax
//! and accumulating the program size; the second pass emits the flat
//! program into a buffer of exactly that size. Each node is five bytes:
//! a one-byte opcode, a two-byte signed displacement threading to the next
//! node (little-endian), and a two-byte operand length back-patched once
//! the operand is complete.

use super::program::*;
use crate::error::{MError, MErrorCode, MResult};

/// Compile step flags passed up the recursive descent.
pub(super) const WORST: u8 = 0;
pub(super) const HASWIDTH: u8 = 1; // known never to match empty string
pub(super) const SIMPLE: u8 = 2; // simple enough to be STAR/PLUS operand
pub(super) const SPSTART: u8 = 4; // starts with * or +

/// Largest representable program; the node threading uses i16 offsets.
const MAXIMUM_PROGRAM_SIZE: usize = 0x7FFF;

/// Where compiled code goes: the sizing pass counts, the emitting pass
/// writes.
pub(super) trait CodeSink {
    /// Append a five-byte node, returning its offset.
    fn node(&mut self, op: u8) -> usize;
    /// Append one operand byte.
    fn emit(&mut self, byte: u8);
    /// Insert an operator node in front of an already-emitted operand.
    fn insert(&mut self, op: u8, operand: usize);
    /// Thread the next-pointer at the end of the chain starting at `p`.
    fn tail(&mut self, p: usize, val: usize);
    /// `tail` on the operand of a BRANCH node; no-op otherwise.
    fn op_tail(&mut self, p: usize, val: usize);
    /// Back-patch the operand length of the node at `op_start`.
    fn set_last_operand_length(&mut self, op_start: usize);
    /// Hook the tails of a whole branch chain to the closing node.
    fn link_branch_tails(&mut self, first: usize, ender: usize);
}

/// First pass: counts bytes, emits nothing.
pub(super) struct Sizer {
    pub size: usize,
}

impl Sizer {
    pub fn new() -> Self {
        Sizer { size: 1 } // the magic byte
    }
}

impl CodeSink for Sizer {
    fn node(&mut self, _op: u8) -> usize {
        self.size += NODE_SIZE;
        0
    }

    fn emit(&mut self, _byte: u8) {
        self.size += 1;
    }

    fn insert(&mut self, _op: u8, _operand: usize) {
        self.size += NODE_SIZE;
    }

    fn tail(&mut self, _p: usize, _val: usize) {}

    fn op_tail(&mut self, _p: usize, _val: usize) {}

    fn set_last_operand_length(&mut self, _op_start: usize) {}

    fn link_branch_tails(&mut self, _first: usize, _ender: usize) {}
}

/// Second pass: emits real code.
pub(super) struct Emitter {
    pub code: Vec<u8>,
}

impl Emitter {
    pub fn new(size_hint: usize) -> Self {
        let mut code = Vec::with_capacity(size_hint);
        code.push(MAGIC);
        Emitter { code }
    }
}

impl CodeSink for Emitter {
    fn node(&mut self, op: u8) -> usize {
        let at = self.code.len();
        self.code.extend_from_slice(&[op, 0, 0, 0, 0]);
        at
    }

    fn emit(&mut self, byte: u8) {
        self.code.push(byte);
    }

    fn insert(&mut self, op: u8, operand: usize) {
        // Relocate the operand five bytes up and drop the operator in.
        let tail: Vec<u8> = self.code[operand..].to_vec();
        self.code.truncate(operand);
        self.code.extend_from_slice(&[op, 0, 0, 0, 0]);
        self.code.extend_from_slice(&tail);
    }

    fn tail(&mut self, p: usize, val: usize) {
        // Find the last node of the chain.
        let mut scan = p;
        while let Some(next) = next_node(&self.code, scan) {
            scan = next;
        }
        let offset = if self.code[scan] == BACK {
            scan as i16 - val as i16
        } else {
            val as i16 - scan as i16
        };
        self.code[scan + 1..scan + 3].copy_from_slice(&offset.to_le_bytes());
    }

    fn op_tail(&mut self, p: usize, val: usize) {
        // "Operandless" and "op != BRANCH" are synonymous in practice.
        if self.code[p] == BRANCH {
            self.tail(p + NODE_SIZE, val);
        }
    }

    fn set_last_operand_length(&mut self, op_start: usize) {
        let len = (self.code.len() - op_start - NODE_SIZE) as i16;
        self.code[op_start + 3..op_start + 5].copy_from_slice(&len.to_le_bytes());
    }

    fn link_branch_tails(&mut self, first: usize, ender: usize) {
        let mut br = Some(first);
        while let Some(b) = br {
            self.op_tail(b, ender);
            br = next_node(&self.code, b);
        }
    }
}

/// Recursive-descent pattern walker, shared by both passes.
pub(super) struct PatternParser<'a, S: CodeSink> {
    pattern: &'a [u8],
    pos: usize,
    npar: usize,
    pub sink: S,
}

impl<'a, S: CodeSink> PatternParser<'a, S> {
    pub fn new(pattern: &'a [u8], sink: S) -> Self {
        PatternParser {
            pattern,
            pos: 0,
            npar: 1,
            sink,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.pattern.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.pattern.len()
    }

    fn is_repn(c: u8) -> bool {
        c == b'*' || c == b'+' || c == b'?'
    }

    /// Regular expression, i.e. main body or parenthesized thing. The
    /// caller absorbs the opening parenthesis.
    pub fn reg(&mut self, paren: bool) -> MResult<(usize, u8)> {
        let mut flags = HASWIDTH; // tentatively
        let mut parno = 0;

        let ret = if paren {
            if self.npar >= super::NUMBER_OF_SUBEXPRESSIONS {
                return Err(MError::plain(
                    MErrorCode::RegexpTooManyParentheses,
                    "Regular expression has too many parentheses",
                ));
            }
            parno = self.npar;
            self.npar += 1;
            self.sink.node(OPEN + parno as u8)
        } else {
            usize::MAX // replaced by the first branch below
        };

        // Pick up the branches, linking them together.
        let (br, branch_flags) = self.regbranch()?;
        let ret = if paren {
            self.sink.tail(ret, br); // OPEN -> first
            ret
        } else {
            br
        };
        flags &= !(!branch_flags & HASWIDTH); // clear bit if bit 0
        flags |= branch_flags & SPSTART;
        while self.peek() == Some(b'|') {
            self.pos += 1;
            let (br, branch_flags) = self.regbranch()?;
            self.sink.tail(ret, br); // BRANCH -> BRANCH
            flags &= !(!branch_flags & HASWIDTH);
            flags |= branch_flags & SPSTART;
        }

        // Make a closing node, and hook it on the end.
        let ender = self.sink.node(if paren { CLOSE + parno as u8 } else { END });
        self.sink.tail(ret, ender);
        self.sink.link_branch_tails(ret, ender);

        // Check for proper termination.
        if paren {
            if self.peek() != Some(b')') {
                return Err(MError::plain(
                    MErrorCode::RegexpUnterminatedParentheses,
                    "Regular expression has unterminated parentheses '('",
                ));
            }
            self.pos += 1;
        } else if !self.at_end() {
            return Err(MError::plain(
                MErrorCode::RegexpUnmatchedParentheses,
                "Regular expression has unmatched parentheses ')'",
            ));
        }
        Ok((ret, flags))
    }

    /// One alternative of an `|` operator; implements concatenation.
    fn regbranch(&mut self) -> MResult<(usize, u8)> {
        let mut flags = WORST; // tentatively
        let ret = self.sink.node(BRANCH);
        let mut chain: Option<usize> = None;
        while let Some(c) = self.peek() {
            if c == b'|' || c == b')' {
                break;
            }
            let (latest, piece_flags) = self.regpiece()?;
            flags |= piece_flags & HASWIDTH;
            match chain {
                None => flags |= piece_flags & SPSTART, // first piece
                Some(prev) => self.sink.tail(prev, latest),
            }
            chain = Some(latest);
        }
        if chain.is_none() {
            // Loop ran zero times
            self.sink.node(NOTHING);
        }
        Ok((ret, flags))
    }

    /// Something followed by possible `*`, `+`, or `?`.
    fn regpiece(&mut self) -> MResult<(usize, u8)> {
        let (ret, atom_flags) = self.regatom()?;

        let op = match self.peek() {
            Some(c) if Self::is_repn(c) => c,
            _ => return Ok((ret, atom_flags)),
        };

        if atom_flags & HASWIDTH == 0 && op != b'?' {
            return Err(MError::plain(
                MErrorCode::RegexpRepeatCouldBeEmpty,
                "Regular expression operand '*+' could be empty",
            ));
        }
        let flags = match op {
            b'*' => WORST | SPSTART,
            b'+' => WORST | SPSTART | HASWIDTH,
            _ => WORST,
        };

        if op == b'*' && atom_flags & SIMPLE != 0 {
            self.sink.insert(STAR, ret);
        } else if op == b'*' {
            // Emit x* as (x&|), where & means "self".
            self.sink.insert(BRANCH, ret); // either x
            let back = self.sink.node(BACK);
            self.sink.op_tail(ret, back); // and loop
            self.sink.op_tail(ret, ret); // back
            let branch = self.sink.node(BRANCH);
            self.sink.tail(ret, branch); // or
            let nothing = self.sink.node(NOTHING);
            self.sink.tail(ret, nothing); // null
        } else if op == b'+' && atom_flags & SIMPLE != 0 {
            self.sink.insert(PLUS, ret);
        } else if op == b'+' {
            // Emit x+ as x(&|), where & means "self".
            let next = self.sink.node(BRANCH); // either
            self.sink.tail(ret, next);
            let back = self.sink.node(BACK);
            self.sink.tail(back, ret); // loop back
            let branch = self.sink.node(BRANCH);
            self.sink.tail(next, branch); // or
            let nothing = self.sink.node(NOTHING);
            self.sink.tail(ret, nothing); // null
        } else {
            // Emit x? as (x|)
            self.sink.insert(BRANCH, ret); // either x
            let branch = self.sink.node(BRANCH);
            self.sink.tail(ret, branch); // or
            let nothing = self.sink.node(NOTHING); // null
            self.sink.tail(ret, nothing);
            self.sink.op_tail(ret, nothing);
        }
        self.pos += 1;
        if self.peek().is_some_and(Self::is_repn) {
            return Err(MError::plain(
                MErrorCode::RegexpNestedRepeat,
                "Regular expression has nested '*?+'",
            ));
        }
        Ok((ret, flags))
    }

    /// The lowest level: gobbles an entire sequence of ordinary characters
    /// into a single EXACTLY node, since that is smaller to store and
    /// faster to run.
    fn regatom(&mut self) -> MResult<(usize, u8)> {
        let mut flags = WORST; // tentatively
        let c = self.peek().unwrap_or(0);
        self.pos += 1;
        let ret = match c {
            b'^' => self.sink.node(BOL),
            b'$' => self.sink.node(EOL),
            b'.' => {
                flags |= HASWIDTH | SIMPLE;
                self.sink.node(ANY)
            }
            b'[' => {
                let ret = self.regclass()?;
                flags |= HASWIDTH | SIMPLE;
                ret
            }
            b'(' => {
                let (ret, sub_flags) = self.reg(true)?;
                flags |= sub_flags & (HASWIDTH | SPSTART);
                ret
            }
            b'?' | b'+' | b'*' => {
                return Err(MError::plain(
                    MErrorCode::RegexpRepeatFollowsNothing,
                    "Regular expression has '?', '+' or '*' that follows nothing",
                ));
            }
            b'\\' => match self.peek() {
                None => {
                    return Err(MError::plain(
                        MErrorCode::RegexpTrailingEscape,
                        "Regular expression has trailing '\\'",
                    ));
                }
                Some(b'<') => {
                    self.pos += 1;
                    self.sink.node(WORDA)
                }
                Some(b'>') => {
                    self.pos += 1;
                    self.sink.node(WORDZ)
                }
                Some(_) => {
                    // Quoted character, handled by the exact-match path
                    self.pos += 1;
                    return self.regexactly(&mut flags);
                }
            },
            _ => return self.regexactly(&mut flags),
        };
        Ok((ret, flags))
    }

    /// Character class `[...]`.
    fn regclass(&mut self) -> MResult<usize> {
        let ret = if self.peek() == Some(b'^') {
            self.pos += 1;
            self.sink.node(ANYBUT)
        } else {
            self.sink.node(ANYOF)
        };
        // A leading ']' or '-' is a literal member.
        if let Some(c) = self.peek() {
            if c == b']' || c == b'-' {
                self.sink.emit(c);
                self.pos += 1;
            }
        }
        let mut closed = false;
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == b']' {
                closed = true;
                break;
            }
            if c != b'-' {
                self.sink.emit(c);
            } else {
                match self.peek() {
                    None | Some(b']') => self.sink.emit(b'-'),
                    Some(range_end) => {
                        let range_start = self.pattern[self.pos - 2];
                        if range_start > range_end {
                            return Err(MError::plain(
                                MErrorCode::RegexpInvalidRange,
                                "Regular expression has invalid range within '[]'",
                            ));
                        }
                        for b in range_start + 1..=range_end {
                            self.sink.emit(b);
                        }
                        self.pos += 1;
                    }
                }
            }
        }
        if !closed {
            return Err(MError::plain(
                MErrorCode::RegexpUnmatchedBrace,
                "Regular expression has unmatched '[]'",
            ));
        }
        self.sink.set_last_operand_length(ret);
        Ok(ret)
    }

    /// Encode a string of characters to be matched exactly. Tricky due to
    /// quoted characters and due to `*`, `+`, `?` taking the single
    /// previous character as their operand.
    fn regexactly(&mut self, flags: &mut u8) -> MResult<(usize, u8)> {
        self.pos -= 1; // look at the current char again
        let ret = self.sink.node(EXACTLY);
        // Backup point to un-read the current char when a repeat follows
        // a multi-character string.
        let mut prev: Option<usize> = None;
        'scan: while !self.at_end() {
            let ch = self.pattern[self.pos];
            self.pos += 1;
            match self.peek() {
                Some(b'.') | Some(b'[') | Some(b'(') | Some(b')') | Some(b'|') | Some(b'\n')
                | Some(b'$') | Some(b'^') | None => {
                    self.sink.emit(ch); // dump the char and we are done
                    break 'scan;
                }
                Some(b'?') | Some(b'+') | Some(b'*') => {
                    if prev.is_none() {
                        // Just this char in the string: it is the operand
                        self.sink.emit(ch);
                        break 'scan;
                    }
                    // End the multi-char string one early
                    self.pos = prev.unwrap();
                    break 'scan;
                }
                Some(b'\\') => {
                    self.sink.emit(ch);
                    if self.pos + 1 >= self.pattern.len() {
                        // An end-backslash is not allowed
                        return Err(MError::plain(
                            MErrorCode::RegexpTrailingEscape,
                            "Regular expression has trailing '\\'",
                        ));
                    }
                    match self.pattern[self.pos + 1] {
                        b'<' | b'>' => break 'scan, // not quoted
                        _ => {
                            // Backup point is the backslash, scan point after it
                            prev = Some(self.pos);
                            self.pos += 1;
                            continue 'scan;
                        }
                    }
                }
                Some(_) => self.sink.emit(ch),
            }
            prev = Some(self.pos);
        }
        self.sink.set_last_operand_length(ret);
        *flags |= HASWIDTH;
        if prev.is_none() {
            // One char only
            *flags |= SIMPLE;
        }
        Ok((ret, *flags))
    }
}

/// Run both passes over a prepared (case-folded) pattern.
pub(super) fn compile_pattern(pattern: &str) -> MResult<(Vec<u8>, u8)> {
    // First pass: determine size and legality.
    let mut sizing = PatternParser::new(pattern.as_bytes(), Sizer::new());
    let (_, _) = sizing.reg(false)?;
    let size = sizing.sink.size;
    if size >= MAXIMUM_PROGRAM_SIZE {
        return Err(MError::plain(
            MErrorCode::RegexpTooBig,
            "Regular expression is too big",
        ));
    }

    // Second pass: emit code.
    let mut emitting = PatternParser::new(pattern.as_bytes(), Emitter::new(size));
    let (_, flags) = emitting.reg(false)?;
    debug_assert_eq!(emitting.sink.code.len(), size);
    Ok((emitting.sink.code, flags))
}
