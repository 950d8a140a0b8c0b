//! Count symbol occurrences over the whole input.

use std::collections::HashMap;
use crate::symbol::Symbol;

/// Map from symbols to occurrence counts.
/// Iteration follows the order in which symbols were first encountered,
/// the tree builder depends on this to break ties reproducibly.
pub struct FrequencyTable<S: Symbol> {
    /// (symbol,count) in first-encounter order
    counts: Vec<(S,u64)>,
    /// map from symbol to slot in `counts`
    slot: HashMap<S,usize>
}

impl <S: Symbol> FrequencyTable<S> {
    pub fn new() -> Self {
        Self {
            counts: Vec::new(),
            slot: HashMap::new()
        }
    }
    /// Count every symbol in one pass.
    pub fn from_symbols(symbols: &[S]) -> Self {
        let mut ans = Self::new();
        for s in symbols {
            ans.add(*s);
        }
        log::debug!("counted {} symbols, {} distinct",symbols.len(),ans.len());
        ans
    }
    pub fn add(&mut self,symbol: S) {
        match self.slot.get(&symbol) {
            Some(i) => self.counts[*i].1 += 1,
            None => {
                self.slot.insert(symbol,self.counts.len());
                self.counts.push((symbol,1));
            }
        }
    }
    /// number of distinct symbols
    pub fn len(&self) -> usize {
        self.counts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
    pub fn get(&self,symbol: &S) -> Option<u64> {
        self.slot.get(symbol).map(|i| self.counts[*i].1)
    }
    /// sum of all counts, equals the length of the input
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_,c)| *c).sum()
    }
    pub fn iter(&self) -> impl Iterator<Item = (S,u64)> + '_ {
        self.counts.iter().copied()
    }
}

impl <S: Symbol> Default for FrequencyTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn counts_in_encounter_order() {
    let freq = FrequencyTable::from_symbols("AAABBCCA".as_bytes());
    let v: Vec<(u8,u64)> = freq.iter().collect();
    assert_eq!(v,vec![(b'A',4),(b'B',2),(b'C',2)]);
    assert_eq!(freq.total(),8);
    assert_eq!(freq.get(&b'C'),Some(2));
    assert_eq!(freq.get(&b'Z'),None);

    let freq = FrequencyTable::from_symbols(&"zebra".chars().collect::<Vec<char>>());
    let order: Vec<char> = freq.iter().map(|(s,_)| s).collect();
    assert_eq!(order,vec!['z','e','b','r','a']);
}

#[test]
fn empty_input() {
    let freq: FrequencyTable<u8> = FrequencyTable::from_symbols(&[]);
    assert!(freq.is_empty());
    assert_eq!(freq.total(),0);
}
