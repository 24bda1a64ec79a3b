//! Shannon-Fano prefix coding
//!
//! Symbols are sorted once by descending frequency and the sorted list is split at its midpoint,
//! lower half on the left, until every half holds a single symbol. This is a simplified variant of
//! canonical Shannon-Fano (which splits where the cumulative frequencies balance) and can produce
//! longer codes than necessary, but it is kept so that tables match ones made by older tools.

use std::{collections::HashMap, fmt, hash::Hash};

use super::{freq::FrequencyTable, CodecErr, CodecResult, Compressor};

/// One node of a Shannon-Fano tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<S> {
    Leaf {
        symbol: S,
        freq: usize,
    },
    /// `freq` is always the sum of both children's frequencies
    Internal {
        freq: usize,
        left: Box<Node<S>>,
        right: Box<Node<S>>,
    },
}

impl<S: Clone> Node<S> {
    /// Build a tree from a table of symbol frequencies, failing if the table is empty
    pub fn build(freqs: FrequencyTable<S>) -> CodecResult<Self> {
        let mut sorted = freqs.into_entries();
        if sorted.is_empty() {
            return Err(CodecErr::EmptyInput);
        }

        //Stable, so equal frequencies stay in first-appearance order
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(Self::split(&sorted))
    }

    /// Recursively split a non-empty, sorted list of symbols into a subtree
    fn split(nodes: &[(S, usize)]) -> Self {
        match nodes {
            [(symbol, freq)] => Node::Leaf {
                symbol: symbol.clone(),
                freq: *freq,
            },
            _ => {
                let (left, right) = nodes.split_at(nodes.len() / 2);
                let (left, right) = (Self::split(left), Self::split(right));
                Node::Internal {
                    freq: left.freq() + right.freq(),
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
        }
    }
}

impl<S> Node<S> {
    /// Get the total frequency of every leaf under this node
    #[inline]
    pub fn freq(&self) -> usize {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }

    /// Count the leaves under this node
    pub fn leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.leaves() + right.leaves(),
        }
    }
}

/// The `CodeTable` struct maps every symbol to the binary string of its path through a
/// Shannon-Fano tree, '0' for left and '1' for right. No code is a prefix of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable<S: Eq + Hash> {
    /// Symbols and codes in depth-first order, left before right
    codes: Vec<(S, String)>,

    /// Position of every symbol in `codes`
    index: HashMap<S, usize>,
}

impl<S: Eq + Hash + Clone> CodeTable<S> {
    /// Read every leaf's path out of a tree. A tree that is a single leaf gets the code "0"
    pub fn from_tree(root: &Node<S>) -> Self {
        let mut table = Self {
            codes: Vec::with_capacity(root.leaves()),
            index: HashMap::new(),
        };
        match root {
            Node::Leaf { symbol, .. } => table.push(symbol.clone(), "0".to_owned()),
            internal => table.traverse(internal, &mut String::new()),
        }
        table
    }

    /// Count, build a tree and assign codes for a symbol sequence
    pub fn from_symbols(input: impl IntoIterator<Item = S>) -> CodecResult<Self> {
        let freqs = FrequencyTable::count(input);
        Ok(Self::from_tree(&Node::build(freqs)?))
    }

    /// Build a table from already assigned (symbol, code) pairs, like those read back from an
    /// artifact. Returns `None` if a symbol repeats
    pub fn from_codes(codes: impl IntoIterator<Item = (S, String)>) -> Option<Self> {
        let mut table = Self {
            codes: Vec::new(),
            index: HashMap::new(),
        };
        for (symbol, code) in codes {
            if table.index.contains_key(&symbol) {
                return None;
            }
            table.push(symbol, code);
        }
        Some(table)
    }

    fn traverse(&mut self, node: &Node<S>, path: &mut String) {
        match node {
            Node::Leaf { symbol, .. } => self.push(symbol.clone(), path.clone()),
            Node::Internal { left, right, .. } => {
                path.push('0');
                self.traverse(left, path);
                path.pop();
                path.push('1');
                self.traverse(right, path);
                path.pop();
            }
        }
    }

    fn push(&mut self, symbol: S, code: String) {
        self.index.insert(symbol.clone(), self.codes.len());
        self.codes.push((symbol, code));
    }

    /// Get the code of a symbol
    pub fn code(&self, symbol: &S) -> Option<&str> {
        self.index.get(symbol).map(|&i| self.codes[i].1.as_str())
    }

    /// Build the inverse mapping of code -> symbol used for decoding
    pub fn inverse(&self) -> HashMap<&str, &S> {
        self.codes
            .iter()
            .map(|(symbol, code)| (code.as_str(), symbol))
            .collect()
    }

    /// Check that no code is empty or a prefix of another
    pub fn is_prefix_free(&self) -> bool {
        self.codes.iter().all(|(_, code)| !code.is_empty())
            && self.codes.iter().enumerate().all(|(i, (_, a))| {
                self.codes
                    .iter()
                    .enumerate()
                    .all(|(j, (_, b))| i == j || !b.starts_with(a.as_str()))
            })
    }
}

impl CodeTable<char> {
    /// Build a code table for the characters of some text
    #[inline]
    pub fn from_text(text: &str) -> CodecResult<Self> {
        Self::from_symbols(text.chars())
    }
}

impl<S: Eq + Hash> CodeTable<S> {
    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterate over (symbol, code) pairs in tree order
    pub fn iter(&self) -> impl Iterator<Item = (&S, &str)> {
        self.codes.iter().map(|(s, code)| (s, code.as_str()))
    }
}

/// The `ShannonFano` struct encodes symbol sequences into bitstrings of '0' and '1' characters
/// using a [CodeTable], and decodes them back
pub struct ShannonFano<'a, S: Eq + Hash> {
    table: &'a CodeTable<S>,
}

impl<'a, S: Eq + Hash + Clone + fmt::Debug> ShannonFano<'a, S> {
    pub fn new(table: &'a CodeTable<S>) -> Self {
        Self { table }
    }

    /// Append the code of every symbol to `out`, failing on the first symbol that has no code
    pub fn encode<W: fmt::Write>(
        &self,
        input: impl IntoIterator<Item = S>,
        out: &mut W,
    ) -> CodecResult<()> {
        for symbol in input {
            let code = self
                .table
                .code(&symbol)
                .ok_or_else(|| CodecErr::UnknownSymbol(format!("{:?}", symbol)))?;
            out.write_str(code)?;
        }
        Ok(())
    }

    /// Greedily match codes from the left of a bitstring, returning the decoded symbols and the
    /// number of bits left over at the end that never completed a code. Leftover bits are dropped
    pub fn decode(&self, bits: &str) -> (Vec<S>, usize) {
        let inverse = self.table.inverse();
        let mut out = Vec::new();
        let mut start = 0usize;

        for (i, c) in bits.char_indices() {
            let end = i + c.len_utf8();
            if let Some(&symbol) = inverse.get(&bits[start..end]) {
                out.push(symbol.clone());
                start = end;
            }
        }

        (out, bits[start..].chars().count())
    }
}

impl Compressor for ShannonFano<'_, char> {
    type Error = CodecErr;

    fn compress<W: fmt::Write>(&self, input: &str, writer: &mut W) -> CodecResult<()> {
        self.encode(input.chars(), writer)
    }

    fn decompress<W: fmt::Write>(&self, input: &str, writer: &mut W) -> CodecResult<()> {
        let (symbols, _) = self.decode(input);
        for symbol in symbols {
            writer.write_char(symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_freqs<S>(node: &Node<S>) -> usize {
        match node {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, left, right } => {
                assert_eq!(*freq, check_freqs(left) + check_freqs(right));
                *freq
            }
        }
    }

    #[test]
    fn midpoint_split() {
        let freqs = FrequencyTable::count("aaaaabbrrcd".chars());
        let tree = Node::build(freqs).unwrap();
        assert_eq!(tree.leaves(), 5);
        assert_eq!(check_freqs(&tree), 11);

        //Sorted: a5 b2 r2 c1 d1 -> [a b] [r c d] -> [r] [c d]
        let table = CodeTable::from_tree(&tree);
        let codes = table.iter().map(|(s, c)| (*s, c)).collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![('a', "00"), ('b', "01"), ('r', "10"), ('c', "110"), ('d', "111")]
        );
        assert!(table.is_prefix_free());
    }

    #[test]
    fn single_leaf_gets_zero() {
        let table = CodeTable::from_text("zzzz").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.code(&'z'), Some("0"));
        assert!(table.is_prefix_free());
    }

    #[test]
    fn two_symbols() {
        let table = CodeTable::from_text("abb").unwrap();
        assert_eq!(table.code(&'b'), Some("0"));
        assert_eq!(table.code(&'a'), Some("1"));
    }

    #[test]
    fn empty_is_rejected() {
        assert!(matches!(CodeTable::from_text(""), Err(CodecErr::EmptyInput)));
    }

    #[test]
    fn encode_decode() {
        let table = CodeTable::from_text("abcabc").unwrap();
        let codec = ShannonFano::new(&table);
        let bits = codec.compress_string("abcabc").unwrap();
        assert_eq!(bits, "0101101011");
        assert_eq!(codec.decompress_string(&bits).unwrap(), "abcabc");
    }

    #[test]
    fn unknown_symbol() {
        let table = CodeTable::from_text("ab").unwrap();
        let err = ShannonFano::new(&table).compress_string("abc").unwrap_err();
        assert!(matches!(err, CodecErr::UnknownSymbol(s) if s == "'c'"));
    }

    #[test]
    fn leftover_bits_are_dropped() {
        let table = CodeTable::from_text("abcabc").unwrap();
        let (symbols, trailing) = ShannonFano::new(&table).decode("01011");
        assert_eq!(symbols, vec!['a', 'b']);
        assert_eq!(trailing, 1);
    }

    #[test]
    fn generic_symbols() {
        let words = vec!["to", "be", "or", "not", "to", "be"];
        let table = CodeTable::from_symbols(words.iter().copied()).unwrap();
        let codec = ShannonFano::new(&table);
        let mut bits = String::new();
        codec.encode(words.iter().copied(), &mut bits).unwrap();
        let (back, trailing) = codec.decode(&bits);
        assert_eq!(back, words);
        assert_eq!(trailing, 0);
    }
}
