//! LZ77 compression of text using a small sliding look-back window
//!
//! Compressed text is a stream of `<offset,length,next>` tokens written one after another with
//! nothing between them. A token copies `length` characters starting `offset` characters back
//! from the end of the decoded text, then appends `next`. Literal characters are written as
//! `<0,0,c>`, and any character outside of angle brackets is also taken as a literal.

use std::{fmt, str::FromStr};

use super::{CodecErr, CodecResult, Compressor};

/// One element of an LZ77 token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A single character with no back reference
    Literal(char),
    /// Copy `len` characters from `offset` characters back, then append `next`. `next` is `None`
    /// only when the match runs up to the end of the input
    Reference {
        offset: usize,
        len: usize,
        next: Option<char>,
    },
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(c) => write!(f, "<0,0,{}>", c),
            Token::Reference { offset, len, next } => {
                write!(f, "<{},{},", offset, len)?;
                if let Some(c) = next {
                    write!(f, "{}", c)?;
                }
                f.write_str(">")
            }
        }
    }
}

impl FromStr for Token {
    type Err = CodecErr;

    /// Parse one `<offset,length,next>` token, brackets included
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CodecErr::MalformedToken(s.trim_start_matches('<').trim_end_matches('>').to_owned());
        let body = s
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .ok_or_else(malformed)?;

        let mut fields = body.splitn(3, ',');
        let (offset, len, next) = match (fields.next(), fields.next(), fields.next()) {
            (Some(offset), Some(len), Some(next)) => (offset, len, next),
            _ => return Err(malformed()),
        };
        let offset = offset.parse::<usize>().map_err(|_| malformed())?;
        let len = len.parse::<usize>().map_err(|_| malformed())?;

        let mut next_chars = next.chars();
        let next = match (next_chars.next(), next_chars.next()) {
            (None, _) => None,
            (Some(c), None) => Some(c),
            (Some(_), Some(_)) => return Err(malformed()),
        };

        Ok(match (offset, len, next) {
            (0, 0, Some(c)) => Token::Literal(c),
            (offset, len, next) => Token::Reference { offset, len, next },
        })
    }
}

/// State of the [Scanner]
#[derive(Clone, Copy)]
enum Scan {
    /// Between tokens, where plain characters are literals
    InLiteral,
    /// After a '<' and before the closing '>'
    InToken,
}

/// The `Scanner` struct splits a textual token stream into [Token]s in a single pass. An
/// unterminated token at the end of the stream ends the scan without an error, as does the first
/// malformed token after it is reported
pub struct Scanner<'a> {
    chars: std::str::Chars<'a>,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(stream: &'a str) -> Self {
        Self {
            chars: stream.chars(),
            done: false,
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = CodecResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut state = Scan::InLiteral;
        let mut token = String::new();
        loop {
            let c = match self.chars.next() {
                Some(c) => c,
                None => {
                    self.done = true; //Drop any token that was never closed
                    return None;
                }
            };

            match (state, c) {
                (Scan::InLiteral, '<') => {
                    token.push(c);
                    state = Scan::InToken;
                }
                (Scan::InLiteral, c) => return Some(Ok(Token::Literal(c))),
                (Scan::InToken, '>') => {
                    token.push(c);
                    let parsed = token.parse::<Token>();
                    self.done = parsed.is_err();
                    return Some(parsed);
                }
                (Scan::InToken, c) => token.push(c),
            }
        }
    }
}

/// Remove every '<', '>' and ',' from a token stream, leaving only the numbers and characters
pub fn strip_markup(stream: &str) -> String {
    stream
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ','))
        .collect()
}

/// The `Lz77` struct compresses text with the lz77 algorithm, searching a fixed number of
/// characters back for the longest match at every position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77 {
    /// How many characters back to search for matches
    window: usize,
}

impl Default for Lz77 {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

impl Lz77 {
    /// The window size used when none is given
    pub const DEFAULT_WINDOW: usize = 7;

    /// Create a new Lz77 compressor with the given window size
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Compress text into a list of tokens
    pub fn encode(&self, text: &str) -> Vec<Token> {
        let text = text.chars().collect::<Vec<_>>();
        let mut out = Vec::new();

        let mut pos = 0usize;
        while pos < text.len() {
            let (offset, len) = self.longest_match(&text, pos); //Get the best match in the previous data
            if len == 0 {
                out.push(Token::Literal(text[pos]));
                pos += 1;
            } else {
                out.push(Token::Reference {
                    offset,
                    len,
                    next: text.get(pos + len).copied(),
                });
                pos += len + 1;
            }
        }

        out
    }

    /// Search the window for the longest match and return the pair of (offset, len), or (0, 0) if
    /// there is no match. A match lies wholly inside the window and never runs past the end of the
    /// text. Of several matches with the same length, the closest one wins
    ///
    /// Every length is searched separately so this is O(window²) per position, which is fine for
    /// the small windows this is meant for
    fn longest_match(&self, text: &[char], pos: usize) -> (usize, usize) {
        let start = pos.saturating_sub(self.window);
        let max_len = self.window.min(pos).min(text.len() - pos);

        let mut best = (0, 0);
        for len in 1..=max_len {
            let pattern = &text[pos..pos + len];
            match (start..=pos - len)
                .rev()
                .find(|&off| &text[off..off + len] == pattern)
            {
                Some(off) => best = (pos - off, len),
                //No longer match can exist if this prefix has none
                None => break,
            }
        }

        best
    }

    /// Replay a list of tokens, copying back references from the already decoded text
    pub fn decode(tokens: impl IntoIterator<Item = Token>) -> CodecResult<String> {
        let mut out = Vec::new();
        for token in tokens {
            Self::expand(token, &mut out)?;
        }
        Ok(out.into_iter().collect())
    }

    fn expand(token: Token, out: &mut Vec<char>) -> CodecResult<()> {
        match token {
            Token::Literal(c) => out.push(c),
            Token::Reference { offset: 0, len: 0, next } => out.extend(next),
            Token::Reference { offset, len, next } => {
                if offset == 0 || offset > out.len() {
                    return Err(CodecErr::BadReference {
                        offset,
                        len: out.len(),
                    });
                }

                let start = out.len() - offset;
                let end = start
                    .checked_add(len)
                    .ok_or(CodecErr::ReferenceTooLong(len))?;
                out.try_reserve(len)
                    .map_err(|_| CodecErr::ReferenceTooLong(len))?;

                //Copy one at a time, the match may overlap the characters it produces
                for i in start..end {
                    let c = out[i];
                    out.push(c);
                }
                out.extend(next);
            }
        }
        Ok(())
    }
}

impl Compressor for Lz77 {
    type Error = CodecErr;

    fn compress<W: fmt::Write>(&self, input: &str, writer: &mut W) -> CodecResult<()> {
        for token in self.encode(input) {
            write!(writer, "{}", token)?;
        }
        Ok(())
    }

    fn decompress<W: fmt::Write>(&self, input: &str, writer: &mut W) -> CodecResult<()> {
        let mut out = Vec::new();
        for token in Scanner::new(input) {
            Self::expand(token?, &mut out)?;
        }
        for c in out {
            writer.write_char(c)?;
        }
        Ok(())
    }
}
