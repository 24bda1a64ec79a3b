//! Two stage text compression: Shannon-Fano coding of the input symbols into a bitstring of '0'
//! and '1' characters, followed by LZ77 compression of that bitstring into a textual token stream.
//!
//! ```
//! let (bits, table, tokens) = sflz::compress("abcabc").unwrap();
//! assert_eq!(bits, "0101101011");
//! assert_eq!(sflz::decompress(&tokens, &table).unwrap(), "abcabc");
//! ```

pub mod ar;
pub mod compress;

use compress::{fano::CodeTable, CodecResult, Pipeline};

/// Compress text with the default LZ77 window, returning the Shannon-Fano bitstring, the code
/// table needed to decode it, and the LZ77 token stream
pub fn compress(text: &str) -> CodecResult<(String, CodeTable<char>, String)> {
    let out = Pipeline::default().compress(text)?;
    Ok((out.bits, out.table, out.tokens))
}

/// Decompress a token stream that [compress] produced. Bits left over at the end of the stream
/// that do not complete a code are discarded
pub fn decompress(tokens: &str, table: &CodeTable<char>) -> CodecResult<String> {
    Ok(Pipeline::default().decompress(tokens, table)?.text)
}
