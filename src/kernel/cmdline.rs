// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Command Line Parsing
//!
//! Boot arguments arrive as whitespace separated `key=value` words. This
//! module reads them in place from the caller's buffer; nothing is copied
//! and nothing is stored globally, so a driver can parse its own slice of
//! the command line at bring-up.
//!
//! # Design
//!
//! - Words are split on spaces, tabs and newlines
//! - A word without `=` is a key with an empty value
//! - The first occurrence of a key wins
//! - Numbers are decimal, or hex with a `0x`/`0X` prefix
//!
//! # Usage
//!
//! ```rust,ignore
//! let cmdline = Cmdline::new("tcu.base=0x10002000 tcu.interrupts=27,26");
//!
//! let base = cmdline.get("tcu.base").and_then(parse_uint);
//! let irqs: Vec<u32> = cmdline.get_list("tcu.interrupts").collect::<Option<_>>()?;
//! ```

/// A borrowed view of a command line
#[derive(Debug, Clone, Copy)]
pub struct Cmdline<'a> {
    data: &'a str,
}

impl<'a> Cmdline<'a> {
    pub const fn new(data: &'a str) -> Self {
        Self { data }
    }

    /// Iterate over `(key, value)` pairs in order
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.data
            .split(|c: char| c == ' ' || c == '\t' || c == '\n' || c == '\r')
            .filter(|word| !word.is_empty())
            .map(|word| match word.split_once('=') {
                Some((key, value)) => (key, value),
                None => (word, ""),
            })
    }

    /// Get a value from the command line
    ///
    /// # Returns
    ///
    /// Value string if found (empty for a bare key), None otherwise
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.entries().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Get a uint32 value, or `default` if absent or malformed
    pub fn get_uint32(&self, key: &str, default: u32) -> u32 {
        self.get(key)
            .and_then(parse_uint)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(default)
    }

    /// Iterate over a comma separated list of numbers
    ///
    /// Yields `None` for each malformed element, and nothing at all if the
    /// key is absent or empty.
    pub fn get_list(&self, key: &str) -> impl Iterator<Item = Option<u64>> + 'a {
        self.get(key)
            .unwrap_or("")
            .split(',')
            .filter(|item| !item.is_empty())
            .map(parse_uint)
    }
}

/// Parse a decimal or `0x`-prefixed hex number
///
/// Returns None on an empty string, a stray character, or overflow.
pub fn parse_uint(s: &str) -> Option<u64> {
    let (digits, base) = match s.as_bytes() {
        [b'0', b'x' | b'X', ..] => (&s[2..], 16),
        _ => (s, 10),
    };
    if digits.is_empty() {
        return None;
    }

    let mut result: u64 = 0;
    for c in digits.bytes() {
        let digit = match c {
            b'0'..=b'9' => (c - b'0') as u64,
            b'a'..=b'f' => (c - b'a' + 10) as u64,
            b'A'..=b'F' => (c - b'A' + 10) as u64,
            _ => return None,
        };
        if digit >= base {
            return None;
        }
        result = result.checked_mul(base)?.checked_add(digit)?;
    }

    Some(result)
}

// ============================================================================
// Tests
// ============================================================================
