use std::fmt;
use thiserror::Error;

pub mod fano;
pub mod freq;
pub mod lz77;

use fano::{CodeTable, ShannonFano};
use lz77::Lz77;

/// Any error that can occur when encoding or decoding with one of the codecs in this module
#[derive(Error, Debug)]
pub enum CodecErr {
    #[error("There is nothing to compress, the input contains no symbols")]
    EmptyInput,

    #[error("The symbol {0} has no entry in the code table")]
    UnknownSymbol(String),

    #[error("The token <{0}> in the LZ77 stream is malformed")]
    MalformedToken(String),

    #[error("A back reference of offset {offset} reaches before the start of the {len} decoded characters")]
    BadReference { offset: usize, len: usize },

    #[error("A back reference of length {0} is too long to decode")]
    ReferenceTooLong(usize),

    #[error("Failed to write codec output: {0}")]
    Fmt(#[from] fmt::Error),
}

/// The `CodecResult<T>` type is a result with an Err variant of [CodecErr]
pub type CodecResult<T> = Result<T, CodecErr>;

/// The `Compressor` trait gives both stages of the pipeline one simple API for turning text into
/// its encoded textual form and back again
pub trait Compressor {
    type Error: From<fmt::Error>;

    /// Compress some input text and write the compressed output to a type implementing `fmt::Write`
    fn compress<W: fmt::Write>(&self, input: &str, writer: &mut W) -> Result<(), Self::Error>;

    /// Decompress some input text and write the decompressed text to a type implementing `fmt::Write`
    fn decompress<W: fmt::Write>(&self, input: &str, writer: &mut W) -> Result<(), Self::Error>;

    /// Compress input into a `String`, convenience wrapper for the `compress` method
    fn compress_string(&self, input: &str) -> Result<String, Self::Error> {
        let mut out = String::new();
        self.compress(input, &mut out)?;
        Ok(out)
    }

    /// Decompress input into a `String`, convenience wrapper for the `decompress` method
    fn decompress_string(&self, input: &str) -> Result<String, Self::Error> {
        let mut out = String::new();
        self.decompress(input, &mut out)?;
        Ok(out)
    }
}

/// Everything produced by one run of the encoding pipeline
#[derive(Debug, Clone)]
pub struct Compressed {
    /// The Shannon-Fano encoded bitstring
    pub bits: String,

    /// The code table needed to decode `bits`, this must be stored next to the token stream
    pub table: CodeTable<char>,

    /// The LZ77 token stream made from `bits`
    pub tokens: String,
}

/// Everything produced by one run of the decoding pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    /// The bitstring recovered from the token stream
    pub bits: String,

    /// The recovered text
    pub text: String,

    /// How many bits at the end of `bits` never matched a code and were discarded
    pub trailing: usize,
}

/// The `Pipeline` struct runs Shannon-Fano coding followed by LZ77 over the produced bitstring,
/// and the reverse for decoding
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    lz: Lz77,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Lz77::DEFAULT_WINDOW)
    }
}

impl Pipeline {
    /// Create a pipeline whose LZ77 stage looks back `window` characters
    pub fn new(window: usize) -> Self {
        Self {
            lz: Lz77::new(window),
        }
    }

    /// Get the LZ77 window size
    #[inline]
    pub fn window(&self) -> usize {
        self.lz.window()
    }

    /// Build a code table for `text`, encode it to a bitstring and LZ77 compress the bitstring
    pub fn compress(&self, text: &str) -> CodecResult<Compressed> {
        let table = CodeTable::from_text(text)?;
        let bits = ShannonFano::new(&table).compress_string(text)?;
        let tokens = self.lz.compress_string(&bits)?;

        Ok(Compressed { bits, table, tokens })
    }

    /// Expand a token stream back into a bitstring and decode it with `table`
    pub fn decompress(&self, tokens: &str, table: &CodeTable<char>) -> CodecResult<Decompressed> {
        let bits = self.lz.decompress_string(tokens)?;
        let (symbols, trailing) = ShannonFano::new(table).decode(&bits);

        Ok(Decompressed {
            text: symbols.into_iter().collect(),
            bits,
            trailing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_roundtrip() {
        let pipeline = Pipeline::default();
        for text in &["aaaa", "abcabc", "the quick brown fox jumps over the lazy dog", "x\ny\n\t'\""] {
            let out = pipeline.compress(text).unwrap();
            assert_eq!(out.table.len(), text.chars().collect::<std::collections::HashSet<_>>().len());
            let back = pipeline.decompress(&out.tokens, &out.table).unwrap();
            assert_eq!(back.bits, out.bits);
            assert_eq!(&back.text, text);
            assert_eq!(back.trailing, 0);
        }
    }

    #[test]
    fn single_symbol_alphabet() {
        let out = Pipeline::default().compress("aaaa").unwrap();
        assert_eq!(out.table.code(&'a'), Some("0"));
        assert_eq!(out.bits, "0000");
        assert_eq!(out.tokens, "<0,0,0><1,1,0><1,1,>");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(Pipeline::default().compress(""), Err(CodecErr::EmptyInput)));
    }

    #[test]
    fn oversized_reference_is_an_error() {
        let table = CodeTable::from_text("ab").unwrap();
        let res = Pipeline::default().decompress("<0,0,0><1,18446744073709551615,1>", &table);
        assert!(matches!(res, Err(CodecErr::ReferenceTooLong(_))));
    }

    #[test]
    fn trailing_bits_are_counted() {
        let pipeline = Pipeline::default();
        let out = pipeline.compress("abcabc").unwrap();
        assert_eq!(out.table.code(&'b'), Some("10"));
        //'1' is only ever the start of a code here
        let mut bits = out.bits.clone();
        bits.push('1');
        let tokens = Lz77::default().compress_string(&bits).unwrap();
        let back = pipeline.decompress(&tokens, &out.table).unwrap();
        assert_eq!(back.text, "abcabc");
        assert_eq!(back.trailing, 1);
    }
}
