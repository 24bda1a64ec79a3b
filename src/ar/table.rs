//! Textual form of a [CodeTable], a one line mapping literal like `{'a': '0', 'b': '10'}`
//!
//! Keys and values are quoted string literals. Single quotes are used unless the text contains a
//! single quote and no double quote.

use std::{iter::Peekable, str::Chars};

use super::{ArErr, ArResult};
use crate::compress::fano::CodeTable;

/// Serialize a code table, entries in table order
pub fn ser_table(table: &CodeTable<char>) -> String {
    let mut out = String::from("{");
    for (i, (symbol, code)) in table.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let mut key = [0u8; 4];
        ser_str(&mut out, symbol.encode_utf8(&mut key));
        out.push_str(": ");
        ser_str(&mut out, code);
    }
    out.push('}');
    out
}

/// Write a quoted, escaped string literal
fn ser_str(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            //Anything that would not survive on one line or is invisible gets a hex escape
            c if c.is_control() || (c.is_whitespace() && c != ' ') => {
                out.push_str(&hex_escape(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Escape a character as `\xNN`, `\uNNNN` or `\UNNNNNNNN`, whichever is the shortest that fits
fn hex_escape(c: char) -> String {
    match c as u32 {
        n @ 0..=0xff => format!("\\x{:02x}", n),
        n @ 0x100..=0xffff => format!("\\u{:04x}", n),
        n => format!("\\U{:08x}", n),
    }
}

/// Parse a serialized code table. Every key must be exactly one character
pub fn read_table(s: &str) -> ArResult<CodeTable<char>> {
    let mut chars = s.chars().peekable();
    let mut entries = Vec::new();

    skip_ws(&mut chars);
    expect(&mut chars, '{')?;
    skip_ws(&mut chars);
    if chars.peek() == Some(&'}') {
        chars.next();
    } else {
        loop {
            let key = read_str(&mut chars)?;
            let mut key_chars = key.chars();
            let symbol = match (key_chars.next(), key_chars.next()) {
                (Some(c), None) => c,
                _ => return Err(bad(format!("the key {:?} is not a single character", key))),
            };

            skip_ws(&mut chars);
            expect(&mut chars, ':')?;
            skip_ws(&mut chars);
            let code = read_str(&mut chars)?;
            entries.push((symbol, code));

            skip_ws(&mut chars);
            match chars.next() {
                Some(',') => skip_ws(&mut chars),
                Some('}') => break,
                Some(c) => return Err(bad(format!("expected ',' or '}}' but found {:?}", c))),
                None => return Err(bad("the mapping is never closed")),
            }
        }
    }

    skip_ws(&mut chars);
    if let Some(c) = chars.next() {
        return Err(bad(format!("unexpected {:?} after the mapping", c)));
    }

    CodeTable::from_codes(entries).ok_or_else(|| bad("a symbol appears more than once"))
}

#[inline]
fn bad(msg: impl Into<String>) -> ArErr {
    ArErr::BadTable(msg.into())
}

fn skip_ws(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().map_or(false, |c| c.is_whitespace()) {
        chars.next();
    }
}

fn expect(chars: &mut Peekable<Chars<'_>>, want: char) -> ArResult<()> {
    match chars.next() {
        Some(c) if c == want => Ok(()),
        Some(c) => Err(bad(format!("expected {:?} but found {:?}", want, c))),
        None => Err(bad(format!("expected {:?} but the line ended", want))),
    }
}

/// Read one quoted string literal, undoing escapes
fn read_str(chars: &mut Peekable<Chars<'_>>) -> ArResult<String> {
    let quote = match chars.next() {
        Some(c @ '\'') | Some(c @ '"') => c,
        Some(c) => return Err(bad(format!("expected a quoted string but found {:?}", c))),
        None => return Err(bad("expected a quoted string but the line ended")),
    };

    let mut out = String::new();
    loop {
        match chars.next() {
            Some(c) if c == quote => return Ok(out),
            Some('\\') => {
                let c = match chars.next() {
                    Some('\\') => '\\',
                    Some('\'') => '\'',
                    Some('"') => '"',
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some('x') => read_hex(chars, 2)?,
                    Some('u') => read_hex(chars, 4)?,
                    Some('U') => read_hex(chars, 8)?,
                    Some(c) => return Err(bad(format!("unknown escape \\{}", c))),
                    None => return Err(bad("the line ends inside an escape")),
                };
                out.push(c);
            }
            Some(c) => out.push(c),
            None => return Err(bad("a string is never closed")),
        }
    }
}

fn read_hex(chars: &mut Peekable<Chars<'_>>, digits: usize) -> ArResult<char> {
    let hex = chars.take(digits).collect::<String>();
    if hex.len() != digits {
        return Err(bad("the line ends inside an escape"));
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(std::char::from_u32)
        .ok_or_else(|| bad(format!("invalid escape value {}", hex)))
}
