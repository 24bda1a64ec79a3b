//! The `ar` module reads and writes the artifacts that the encoder leaves behind for the decoder,
//! all of them plain text files in one directory

pub mod table;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::compress::{fano::CodeTable, lz77, CodecErr, Compressed, Decompressed};

/// The `ArErr` enum enumerates all possible errors that can occur when reading or writing artifacts
#[derive(Debug, Error)]
pub enum ArErr {
    /// An internal I/O error occurred
    #[error("An internal Input / Output error disrupted artifact reading or writing: {0}")]
    Io(#[from] io::Error),

    #[error("An error occurred when encoding or decoding: {0}")]
    Codec(#[from] CodecErr),

    #[error("The Shannon-Fano artifact at {0} has no code table line")]
    MissingTable(String),

    #[error("The code table format is invalid: {0}")]
    BadTable(String),
}

/// The `ArResult<T>` type is a result with an Err variant of [ArErr]
pub type ArResult<T> = Result<T, ArErr>;

/// The `Store` struct names every artifact file inside of one directory and moves pipeline
/// results in and out of them
#[derive(Debug, Clone)]
pub struct Store {
    /// The directory that all artifacts live in
    dir: PathBuf,
}

impl Store {
    /// Raw text that will be compressed
    pub const INPUT_FILE: &'static str = "input.txt";
    /// The Shannon-Fano bitstring on the first line and its code table on the second
    pub const FANO_FILE: &'static str = "shennon_fano.txt";
    /// The LZ77 token stream
    pub const TOKENS_FILE: &'static str = "encode_lz77.txt";
    /// The token stream without any markup
    pub const STRIPPED_FILE: &'static str = "code_lz77.txt";
    /// The bitstring that LZ77 decoding recovered
    pub const BITS_FILE: &'static str = "decoded_lz77.txt";
    /// The fully decoded text
    pub const OUTPUT_FILE: &'static str = "output.txt";

    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_owned(),
        }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the full path of an artifact file
    #[inline]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read the text to compress, from `path` if one is given or the store's input file if not
    pub fn read_input(&self, path: Option<&Path>) -> ArResult<String> {
        let path = path
            .map(Path::to_owned)
            .unwrap_or_else(|| self.path(Self::INPUT_FILE));
        Ok(fs::read_to_string(path)?)
    }

    /// Write the Shannon-Fano and LZ77 artifacts of a compression run
    pub fn save_encoded(&self, compressed: &Compressed) -> ArResult<()> {
        let mut fano = compressed.bits.clone();
        fano.push('\n');
        fano.push_str(&table::ser_table(&compressed.table));

        self.write(Self::FANO_FILE, &fano)?;
        self.write(Self::TOKENS_FILE, &compressed.tokens)
    }

    /// Read back the token stream and code table that [save_encoded](fn@Store::save_encoded) wrote
    pub fn load_encoded(&self) -> ArResult<(String, CodeTable<char>)> {
        let tokens = fs::read_to_string(self.path(Self::TOKENS_FILE))?;

        let fano_path = self.path(Self::FANO_FILE);
        let fano = fs::read_to_string(&fano_path)?;
        let line = fano
            .lines()
            .nth(1)
            .ok_or_else(|| ArErr::MissingTable(fano_path.display().to_string()))?;
        let table = table::read_table(line.trim())?;

        Ok((tokens, table))
    }

    /// Write the artifacts of a decompression run of the token stream `tokens`
    pub fn save_decoded(&self, tokens: &str, decompressed: &Decompressed) -> ArResult<()> {
        self.write(Self::STRIPPED_FILE, &lz77::strip_markup(tokens))?;
        self.write(Self::BITS_FILE, &decompressed.bits)?;
        self.write(Self::OUTPUT_FILE, &decompressed.text)
    }

    /// Write a whole file by way of a temporary file in the same directory, so the target is
    /// either replaced completely or not touched at all
    fn write(&self, name: &str, contents: &str) -> ArResult<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(self.path(name)).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::Pipeline;

    #[test]
    fn encoded_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        fs::write(store.path(Store::INPUT_FILE), "it's a \"test\"\nof lines\n").unwrap();

        let text = store.read_input(None).unwrap();
        let pipeline = Pipeline::default();
        let compressed = pipeline.compress(&text).unwrap();
        store.save_encoded(&compressed).unwrap();

        let fano = fs::read_to_string(store.path(Store::FANO_FILE)).unwrap();
        assert!(fano.starts_with(&format!("{}\n{{", compressed.bits)));

        let (tokens, table) = store.load_encoded().unwrap();
        assert_eq!(tokens, compressed.tokens);
        assert_eq!(table, compressed.table);

        let decompressed = pipeline.decompress(&tokens, &table).unwrap();
        store.save_decoded(&tokens, &decompressed).unwrap();
        assert_eq!(fs::read_to_string(store.path(Store::OUTPUT_FILE)).unwrap(), text);
        assert_eq!(
            fs::read_to_string(store.path(Store::BITS_FILE)).unwrap(),
            compressed.bits
        );
        let stripped = fs::read_to_string(store.path(Store::STRIPPED_FILE)).unwrap();
        assert!(!stripped.contains(|c: char| matches!(c, '<' | '>' | ',')));
    }

    #[test]
    fn missing_table_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        fs::write(store.path(Store::FANO_FILE), "0101").unwrap();
        fs::write(store.path(Store::TOKENS_FILE), "<0,0,0>").unwrap();
        assert!(matches!(store.load_encoded(), Err(ArErr::MissingTable(_))));
    }

    #[test]
    fn missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        assert!(matches!(store.load_encoded(), Err(ArErr::Io(_))));
        assert!(matches!(store.read_input(None), Err(ArErr::Io(_))));
    }
}
