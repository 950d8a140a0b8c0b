//! Derive the code for each symbol by walking the code tree.

use std::collections::BTreeMap;
use bit_vec::BitVec;
use crate::symbol::Symbol;
use crate::tools::code_tree::{CodeTree,Node};
use crate::tools::freq_table::FrequencyTable;
use crate::Error;

/// Map from symbols to their codes.
/// Codes come only from the leaves of a tree, so no code is a prefix of another.
#[derive(Clone,Debug)]
pub struct CodeTable<S: Symbol> {
    codes: BTreeMap<S,BitVec>
}

fn bits_to_string(bits: &BitVec) -> String {
    bits.iter().map(|b| if b { '1' } else { '0' }).collect()
}

impl <S: Symbol> CodeTable<S> {
    /// Walk from the root to every leaf, a left branch appends `0` and a right branch appends `1`.
    /// The walk uses its own stack, so deep trees do not exhaust the call stack.
    pub fn from_tree(tree: &CodeTree<S>) -> Result<Self,Error> {
        let mut codes = BTreeMap::new();
        let mut stack: Vec<(usize,BitVec)> = Vec::new();
        match tree.node(tree.root()) {
            Some(Node::Stem { child, .. }) => {
                if !matches!(tree.node(*child),Some(Node::Leaf { .. })) {
                    log::error!("stem must hold a leaf");
                    return Err(Error::MalformedTree);
                }
                stack.push((*child,BitVec::from_elem(1,false)));
            },
            Some(Node::Branch { .. }) => stack.push((tree.root(),BitVec::new())),
            Some(Node::Leaf { .. }) => {
                log::error!("leaf at the root would have an empty code");
                return Err(Error::MalformedTree);
            },
            None => return Err(Error::MalformedTree)
        }
        let mut visits = 0;
        while let Some((id,code)) = stack.pop() {
            visits += 1;
            if visits > tree.nodes.len() {
                log::error!("tree walk visits more nodes than the tree has");
                return Err(Error::MalformedTree);
            }
            match tree.node(id) {
                Some(Node::Leaf { symbol, .. }) => {
                    log::trace!("{:?} -> {}",symbol,bits_to_string(&code));
                    if codes.insert(*symbol,code).is_some() {
                        log::error!("symbol {:?} is on more than one leaf",symbol);
                        return Err(Error::MalformedTree);
                    }
                },
                Some(Node::Branch { left, right, .. }) => {
                    let mut rcode = code.clone();
                    rcode.push(true);
                    let mut lcode = code;
                    lcode.push(false);
                    stack.push((*right,rcode));
                    stack.push((*left,lcode));
                },
                _ => return Err(Error::MalformedTree)
            }
        }
        Ok(Self { codes })
    }
    pub fn get(&self,symbol: &S) -> Option<&BitVec> {
        self.codes.get(symbol)
    }
    pub fn len(&self) -> usize {
        self.codes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
    /// iterate in symbol order
    pub fn iter(&self) -> impl Iterator<Item = (&S,&BitVec)> {
        self.codes.iter()
    }
    /// Total bits needed to encode symbols with the given frequencies.
    pub fn weighted_length(&self,freq: &FrequencyTable<S>) -> Result<u64,Error> {
        let mut ans = 0;
        for (symbol,count) in freq.iter() {
            let code = self.codes.get(&symbol).ok_or(Error::UnknownSymbol)?;
            ans += count * code.len() as u64;
        }
        Ok(ans)
    }
    /// One `symbol:code` line per symbol, in symbol order.
    pub fn listing(&self) -> String {
        let mut ans = String::new();
        for (symbol,code) in &self.codes {
            ans += &[symbol.label(),":".to_string(),bits_to_string(code),"\n".to_string()].concat();
        }
        ans
    }
}

#[cfg(test)]
fn code_of(s: &str) -> BitVec {
    s.chars().map(|c| c=='1').collect()
}

#[cfg(test)]
fn table_for(txt: &str) -> (FrequencyTable<u8>,CodeTable<u8>) {
    let freq = FrequencyTable::from_symbols(txt.as_bytes());
    let tree = CodeTree::build(&freq).expect("build failed");
    let table = CodeTable::from_tree(&tree).expect("codes failed");
    (freq,table)
}

#[test]
fn known_codes() {
    let (freq,table) = table_for("AAABBCCA");
    assert_eq!(table.len(),3);
    assert_eq!(table.get(&b'A'),Some(&code_of("0")));
    assert_eq!(table.get(&b'B'),Some(&code_of("10")));
    assert_eq!(table.get(&b'C'),Some(&code_of("11")));
    assert_eq!(table.weighted_length(&freq),Ok(12));
    assert_eq!(table.listing(),"A:0\nB:10\nC:11\n");
}

#[test]
fn single_symbol_code() {
    let (freq,table) = table_for("AAAA");
    assert_eq!(table.len(),1);
    assert_eq!(table.get(&b'A'),Some(&code_of("0")));
    assert_eq!(table.weighted_length(&freq),Ok(4));
}

#[test]
fn malformed_trees() {
    let bare = CodeTree { nodes: vec![Node::Leaf { symbol: b'A', weight: 1 }], root: 0 };
    assert_eq!(CodeTable::from_tree(&bare).unwrap_err(),Error::MalformedTree);
    let low_stem = CodeTree {
        nodes: vec![
            Node::Leaf { symbol: b'A', weight: 1 },
            Node::Leaf { symbol: b'B', weight: 1 },
            Node::Stem { weight: 1, child: 1 },
            Node::Branch { weight: 2, left: 0, right: 2 }
        ],
        root: 3
    };
    assert_eq!(CodeTable::from_tree(&low_stem).unwrap_err(),Error::MalformedTree);
    let dangling = CodeTree {
        nodes: vec![
            Node::Leaf { symbol: b'A', weight: 1 },
            Node::Branch { weight: 2, left: 0, right: 7 }
        ],
        root: 1
    };
    assert_eq!(CodeTable::from_tree(&dangling).unwrap_err(),Error::MalformedTree);
    let twice = CodeTree {
        nodes: vec![
            Node::Leaf { symbol: b'A', weight: 1 },
            Node::Leaf { symbol: b'A', weight: 1 },
            Node::Branch { weight: 2, left: 0, right: 1 }
        ],
        root: 2
    };
    assert_eq!(CodeTable::from_tree(&twice).unwrap_err(),Error::MalformedTree);
    let cycle = CodeTree {
        nodes: vec![
            Node::Leaf { symbol: b'A', weight: 1 },
            Node::Branch { weight: 2, left: 0, right: 1 }
        ],
        root: 1
    };
    assert_eq!(CodeTable::from_tree(&cycle).unwrap_err(),Error::MalformedTree);
}

#[test]
fn prefix_free() {
    let (_freq,table) = table_for("I am Sam. Sam I am. I do not like this Sam I am.\n");
    let codes: Vec<&BitVec> = table.iter().map(|(_,c)| c).collect();
    for i in 0..codes.len() {
        assert!(codes[i].len() > 0);
        for j in 0..codes.len() {
            if i != j && codes[i].len() <= codes[j].len() {
                let is_prefix = (0..codes[i].len()).all(|k| codes[i].get(k) == codes[j].get(k));
                assert!(!is_prefix,"code {} is a prefix of code {}",i,j);
            }
        }
    }
}

#[test]
fn optimal_lengths() {
    // a well known case, 23 bits is optimal
    let (freq,table) = table_for("abracadabra");
    assert_eq!(table.weighted_length(&freq),Ok(23));

    // the optimal cost is the sum of all merged weights, compute it without the tree
    let txt = "it was the best of times, it was the worst of times, it was the age of wisdom";
    let (freq,table) = table_for(txt);
    let mut weights: Vec<u64> = freq.iter().map(|(_,c)| c).collect();
    let mut cost = 0;
    while weights.len() > 1 {
        weights.sort_unstable_by(|a,b| b.cmp(a));
        let merged = weights.pop().unwrap() + weights.pop().unwrap();
        cost += merged;
        weights.push(merged);
    }
    assert_eq!(table.weighted_length(&freq),Ok(cost));

    // full binary tree means the Kraft sum is exactly 1
    let max_len = table.iter().map(|(_,c)| c.len()).max().unwrap();
    let kraft: u64 = table.iter().map(|(_,c)| 1u64 << (max_len - c.len())).sum();
    assert_eq!(kraft,1u64 << max_len);
}
