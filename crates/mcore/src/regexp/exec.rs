// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Backtracking executor over the compiled program.
//!
//! Conceptually the strategy is simple: check whether the current node
//! matches, recurse to see whether the rest matches, and act accordingly.
//! Ordinary nodes that do not need to know whether the rest of the match
//! failed are walked by a loop instead of recursion. STAR and PLUS read
//! ahead greedily with [`Executor::repeat`] and then peel back one
//! position at a time, peeking at the next atom's first byte.

use super::program::*;
use super::NUMBER_OF_SUBEXPRESSIONS;

pub(super) struct Executor<'a> {
    code: &'a [u8],
    input: &'a [u8],
    /// Current input position.
    pos: usize,
    pub startp: [Option<usize>; NUMBER_OF_SUBEXPRESSIONS],
    pub endp: [Option<usize>; NUMBER_OF_SUBEXPRESSIONS],
    pub count: usize,
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl<'a> Executor<'a> {
    pub fn new(code: &'a [u8], input: &'a [u8]) -> Self {
        Executor {
            code,
            input,
            pos: 0,
            startp: [None; NUMBER_OF_SUBEXPRESSIONS],
            endp: [None; NUMBER_OF_SUBEXPRESSIONS],
            count: 0,
        }
    }

    /// Try a match starting at `start`; on success slot 0 holds the whole
    /// match.
    pub fn try_at(&mut self, start: usize) -> bool {
        self.pos = start;
        self.startp = [None; NUMBER_OF_SUBEXPRESSIONS];
        self.endp = [None; NUMBER_OF_SUBEXPRESSIONS];
        self.count = 0;
        if self.matches(1) {
            self.startp[0] = Some(start);
            self.endp[0] = Some(self.pos);
            true
        } else {
            false
        }
    }

    fn matches(&mut self, prog: usize) -> bool {
        let mut scan = Some(prog);
        while let Some(node) = scan {
            let next = next_node(self.code, node);
            match op(self.code, node) {
                BOL => {
                    if self.pos != 0 {
                        return false;
                    }
                }
                EOL => {
                    if self.pos != self.input.len() {
                        return false;
                    }
                }
                WORDA => {
                    // Must be looking at a letter, digit, or _
                    if self.pos >= self.input.len() || !is_word(self.input[self.pos]) {
                        return false;
                    }
                    // Prev must be beginning of line or nonword
                    if self.pos > 0 && is_word(self.input[self.pos - 1]) {
                        return false;
                    }
                }
                WORDZ => {
                    // Must be looking at a non-word character
                    if self.pos < self.input.len() && is_word(self.input[self.pos]) {
                        return false;
                    }
                }
                ANY => {
                    if self.pos == self.input.len() {
                        return false;
                    }
                    self.pos += 1;
                }
                EXACTLY => {
                    let len = operand_len(self.code, node);
                    let from = operand(node);
                    let lit = &self.code[from..from + len];
                    if self.pos + len > self.input.len()
                        || &self.input[self.pos..self.pos + len] != lit
                    {
                        return false;
                    }
                    self.pos += len;
                }
                ANYOF => {
                    if self.pos == self.input.len() {
                        return false;
                    }
                    let len = operand_len(self.code, node);
                    let from = operand(node);
                    if !self.code[from..from + len].contains(&self.input[self.pos]) {
                        return false;
                    }
                    self.pos += 1;
                }
                ANYBUT => {
                    if self.pos == self.input.len() {
                        return false;
                    }
                    let len = operand_len(self.code, node);
                    let from = operand(node);
                    if self.code[from..from + len].contains(&self.input[self.pos]) {
                        return false;
                    }
                    self.pos += 1;
                }
                NOTHING | BACK => {}
                o if (OPEN + 1..=OPEN + 9).contains(&o) => {
                    let no = (o - OPEN) as usize;
                    let input = self.pos;
                    return if self.matches(next.expect("OPEN threads forward")) {
                        // Do not move the start if some later invocation of
                        // the same parentheses already set it
                        if self.startp[no].is_none() {
                            self.startp[no] = Some(input);
                        }
                        true
                    } else {
                        false
                    };
                }
                o if (CLOSE + 1..=CLOSE + 9).contains(&o) => {
                    let no = (o - CLOSE) as usize;
                    let input = self.pos;
                    return if self.matches(next.expect("CLOSE threads forward")) {
                        if self.endp[no].is_none() {
                            self.count += 1;
                            self.endp[no] = Some(input);
                        }
                        true
                    } else {
                        false
                    };
                }
                BRANCH => {
                    let save = self.pos;
                    match next {
                        Some(n) if op(self.code, n) == BRANCH => {
                            let mut branch = Some(node);
                            while let Some(b) = branch {
                                if op(self.code, b) != BRANCH {
                                    break;
                                }
                                if self.matches(operand(b)) {
                                    return true;
                                }
                                self.pos = save;
                                branch = next_node(self.code, b);
                            }
                            return false;
                        }
                        _ => {
                            // No choice, avoid recursion
                            scan = Some(operand(node));
                            continue;
                        }
                    }
                }
                STAR | PLUS => {
                    let next = next.expect("repeat threads forward");
                    // Peek at the next atom's first byte to reject cheaply
                    let next_byte = if op(self.code, next) == EXACTLY {
                        Some(self.code[operand(next)])
                    } else {
                        None
                    };
                    let save = self.pos;
                    let min = if op(self.code, node) == STAR { 0 } else { 1 };
                    let mut no = self.repeat(operand(node)) + 1;
                    while no > min {
                        self.pos = save + no - 1;
                        // If it could work, try it
                        let feasible = match next_byte {
                            Some(b) => self.pos < self.input.len() && self.input[self.pos] == b,
                            None => true,
                        };
                        if feasible && self.matches(next) {
                            return true;
                        }
                        no -= 1;
                    }
                    return false;
                }
                END => return true, // success!
                _ => return false,  // corrupted program
            }
            scan = next;
        }
        false // corrupted pointers
    }

    /// How many times something simple matches at the current position.
    fn repeat(&self, node: usize) -> usize {
        let rest = &self.input[self.pos..];
        match op(self.code, node) {
            ANY => rest.len(),
            EXACTLY => {
                let ch = self.code[operand(node)];
                rest.iter().take_while(|&&b| b == ch).count()
            }
            ANYOF => {
                let len = operand_len(self.code, node);
                let from = operand(node);
                let set = &self.code[from..from + len];
                rest.iter().take_while(|&&b| set.contains(&b)).count()
            }
            ANYBUT => {
                let len = operand_len(self.code, node);
                let from = operand(node);
                let set = &self.code[from..from + len];
                rest.iter().take_while(|&&b| !set.contains(&b)).count()
            }
            _ => 0, // called inappropriately
        }
    }
}
