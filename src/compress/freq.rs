//! Symbol counting for building Shannon-Fano trees

use std::{collections::HashMap, hash::Hash};

/// The `FrequencyTable` struct holds how many times every distinct symbol of an input appears.
/// Entries are kept in the order that their symbols first appear in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<S> {
    /// Pairs of (symbol, count)
    entries: Vec<(S, usize)>,
}

impl<S: Eq + Hash + Clone> FrequencyTable<S> {
    /// Count every symbol in an input sequence
    pub fn count(input: impl IntoIterator<Item = S>) -> Self {
        let mut index: HashMap<S, usize> = HashMap::new();
        let mut entries: Vec<(S, usize)> = Vec::new();

        for symbol in input {
            match index.get(&symbol) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(symbol.clone(), entries.len());
                    entries.push((symbol, 1));
                }
            }
        }

        Self { entries }
    }

    /// Get the number of times a symbol appeared, or `None` if it never did
    pub fn get(&self, symbol: &S) -> Option<usize> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, count)| *count)
    }
}

impl<S> FrequencyTable<S> {
    /// Get the number of distinct symbols
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the total number of symbols that were counted
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Iterate over (symbol, count) pairs in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&S, usize)> {
        self.entries.iter().map(|(s, count)| (s, *count))
    }

    /// Consume the table, returning (symbol, count) pairs in first-appearance order
    pub fn into_entries(self) -> Vec<(S, usize)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_chars() {
        let table = FrequencyTable::count("abracadabra".chars());
        assert_eq!(
            table.iter().map(|(s, c)| (*s, c)).collect::<Vec<_>>(),
            vec![('a', 5), ('b', 2), ('r', 2), ('c', 1), ('d', 1)]
        );
        assert_eq!(table.total(), 11);
        assert_eq!(table.get(&'r'), Some(2));
        assert_eq!(table.get(&'z'), None);
    }

    #[test]
    fn count_nothing() {
        let table = FrequencyTable::<u8>::count(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }
}
