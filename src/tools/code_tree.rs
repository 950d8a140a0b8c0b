//! Module to build the Huffman code tree.
//!
//! Nodes are kept in an arena and refer to each other by index.  Every merge appends
//! a new parent, so a parent always comes after its children, and the tree cannot
//! have cycles or shared nodes.
//!
//! The tree can also be written as a descriptor, which is what the container stores.
//! The descriptor is a pre-order walk: a `0` bit is a branch, and is followed by its
//! left and right subtrees, a `1` bit is a leaf, and is followed by the symbol code.

use std::cmp::Reverse;
use std::collections::{BinaryHeap,HashSet};
use bit_vec::BitVec;
use crate::symbol::Symbol;
use crate::tools::freq_table::FrequencyTable;
use crate::Error;

#[derive(Clone,Debug,PartialEq)]
pub enum Node<S: Symbol> {
    Leaf {
        symbol: S,
        weight: u64
    },
    Branch {
        weight: u64,
        left: usize,
        right: usize
    },
    /// Root of a tree with only one symbol.  The lone leaf hangs on the `0` side,
    /// so that it still gets a code with one bit.
    Stem {
        weight: u64,
        child: usize
    }
}

impl <S: Symbol> Node<S> {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Branch { weight, .. } => *weight,
            Node::Stem { weight, .. } => *weight
        }
    }
}

/// Huffman code tree.
/// Trees read back from a descriptor have zero weights, only their shape and symbols are known.
#[derive(Clone,Debug)]
pub struct CodeTree<S: Symbol> {
    pub(crate) nodes: Vec<Node<S>>,
    pub(crate) root: usize
}

/// get the bit at `ptr` and advance, running out is a corrupt descriptor
fn next_bit(bits: &BitVec,ptr: &mut usize) -> Result<bool,Error> {
    match bits.get(*ptr) {
        Some(bit) => {
            *ptr += 1;
            Ok(bit)
        },
        None => {
            log::error!("tree descriptor ends after {} bits",ptr);
            Err(Error::CorruptContainer)
        }
    }
}

/// output `num_bits` of `code` starting from the MSB
fn put_code(num_bits: usize,code: u32,obuf: &mut BitVec) {
    for i in (0..num_bits).rev() {
        obuf.push(code >> i & 1 > 0);
    }
}

impl <S: Symbol> CodeTree<S> {
    /// Build the tree by repeatedly merging the two lightest nodes.
    /// Ties go to the node that was created first, where leaves are created in the order
    /// the frequency table first encountered them, and come before any merged node.
    /// The first node taken becomes the left son.
    pub fn build(freq: &FrequencyTable<S>) -> Result<Self,Error> {
        if freq.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut nodes: Vec<Node<S>> = Vec::with_capacity(2*freq.len());
        // (weight,sequence), the arena index is the creation sequence
        let mut queue: BinaryHeap<Reverse<(u64,usize)>> = BinaryHeap::with_capacity(freq.len());
        for (symbol,weight) in freq.iter() {
            queue.push(Reverse((weight,nodes.len())));
            nodes.push(Node::Leaf { symbol, weight });
        }
        if nodes.len() == 1 {
            log::debug!("only one symbol, tree is a stem");
            let weight = nodes[0].weight();
            nodes.push(Node::Stem { weight, child: 0 });
            return Ok(Self { nodes, root: 1 });
        }
        loop {
            let Reverse((w0,left)) = queue.pop().ok_or(Error::MalformedTree)?;
            let Reverse((w1,right)) = match queue.pop() {
                Some(item) => item,
                None => {
                    log::debug!("built tree with {} nodes, root weight {}",nodes.len(),w0);
                    return Ok(Self { nodes, root: left });
                }
            };
            let weight = w0 + w1;
            log::trace!("merge {} and {} into {} with weight {}",left,right,nodes.len(),weight);
            queue.push(Reverse((weight,nodes.len())));
            nodes.push(Node::Branch { weight, left, right });
        }
    }
    pub fn root(&self) -> usize {
        self.root
    }
    pub fn node(&self,id: usize) -> Option<&Node<S>> {
        self.nodes.get(id)
    }
    /// weight at the root, equals the input length for a freshly built tree
    pub fn weight(&self) -> u64 {
        self.nodes.get(self.root).map_or(0,|n| n.weight())
    }
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n,Node::Leaf { .. })).count()
    }
    /// Append the descriptor of this tree to `bits`.
    /// A stem is not written, the reader restores it when there is only one leaf.
    pub fn write_descriptor(&self,bits: &mut BitVec) -> Result<(),Error> {
        let start = match self.nodes.get(self.root) {
            Some(Node::Stem { child, .. }) => *child,
            Some(_) => self.root,
            None => return Err(Error::MalformedTree)
        };
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            match self.nodes.get(id) {
                Some(Node::Leaf { symbol, .. }) => {
                    bits.push(true);
                    put_code(S::BITS,symbol.to_code(),bits);
                },
                Some(Node::Branch { left, right, .. }) => {
                    bits.push(false);
                    stack.push(*right);
                    stack.push(*left);
                },
                _ => return Err(Error::MalformedTree)
            }
        }
        Ok(())
    }
    /// Rebuild a tree from the descriptor starting at bit `ptr`, which is left pointing
    /// just past the descriptor.  The descriptor must hold exactly `leaf_count` distinct symbols.
    pub fn read_descriptor(bits: &BitVec,ptr: &mut usize,leaf_count: usize) -> Result<Self,Error> {
        if leaf_count == 0 || leaf_count > 1 << S::BITS {
            log::error!("leaf count {} is out of range",leaf_count);
            return Err(Error::CorruptContainer);
        }
        let max_nodes = 2*leaf_count - 1;
        let mut nodes: Vec<Node<S>> = Vec::new();
        let mut seen: HashSet<S> = HashSet::new();
        // branches still waiting for sons, with the number of sons attached so far
        let mut open: Vec<(usize,u8)> = Vec::new();
        loop {
            if nodes.len() >= max_nodes {
                log::error!("tree descriptor has more nodes than {} leaves allow",leaf_count);
                return Err(Error::CorruptContainer);
            }
            let id = nodes.len();
            let is_leaf = next_bit(bits,ptr)?;
            if is_leaf {
                let mut code: u32 = 0;
                for _i in 0..S::BITS {
                    code = (code << 1) | next_bit(bits,ptr)? as u32;
                }
                let symbol = match S::from_code(code) {
                    Some(s) => s,
                    None => {
                        log::error!("invalid symbol code {:#x} in tree descriptor",code);
                        return Err(Error::CorruptContainer);
                    }
                };
                if !seen.insert(symbol) {
                    log::error!("symbol {:?} appears twice in tree descriptor",symbol);
                    return Err(Error::CorruptContainer);
                }
                nodes.push(Node::Leaf { symbol, weight: 0 });
            } else {
                // sons are filled in as they are read
                nodes.push(Node::Branch { weight: 0, left: id, right: id });
            }
            let mut full = false;
            if let Some((parent,filled)) = open.last_mut() {
                if let Node::Branch { left, right, .. } = &mut nodes[*parent] {
                    match *filled {
                        0 => *left = id,
                        _ => *right = id
                    }
                }
                *filled += 1;
                full = *filled == 2;
            }
            if full {
                open.pop();
            }
            if !is_leaf {
                open.push((id,0));
            }
            if open.is_empty() {
                break;
            }
        }
        if seen.len() != leaf_count {
            log::error!("tree descriptor has {} leaves, expected {}",seen.len(),leaf_count);
            return Err(Error::CorruptContainer);
        }
        if nodes.len() == 1 {
            nodes.push(Node::Stem { weight: 0, child: 0 });
            return Ok(Self { nodes, root: 1 });
        }
        Ok(Self { nodes, root: 0 })
    }
}

#[test]
fn tree_shape() {
    // A:4 B:2 C:2, B and C merge first, then A with the merged node
    let freq = FrequencyTable::from_symbols("AAABBCCA".as_bytes());
    let tree = CodeTree::build(&freq).expect("build failed");
    assert_eq!(tree.root(),4);
    assert_eq!(tree.weight(),8);
    assert_eq!(tree.leaf_count(),3);
    assert_eq!(tree.node(3),Some(&Node::Branch { weight: 4, left: 1, right: 2 }));
    assert_eq!(tree.node(4),Some(&Node::Branch { weight: 8, left: 0, right: 3 }));
}

#[test]
fn ties_follow_creation_order() {
    let freq = FrequencyTable::from_symbols("abcd".as_bytes());
    let tree = CodeTree::build(&freq).expect("build failed");
    assert_eq!(tree.node(4),Some(&Node::Branch { weight: 2, left: 0, right: 1 }));
    assert_eq!(tree.node(5),Some(&Node::Branch { weight: 2, left: 2, right: 3 }));
    assert_eq!(tree.node(6),Some(&Node::Branch { weight: 4, left: 4, right: 5 }));
    assert_eq!(tree.root(),6);
}

#[test]
fn single_symbol_is_stem() {
    let freq = FrequencyTable::from_symbols("AAAA".as_bytes());
    let tree = CodeTree::build(&freq).expect("build failed");
    assert_eq!(tree.node(tree.root()),Some(&Node::Stem { weight: 4, child: 0 }));
    assert_eq!(tree.weight(),4);
}

#[test]
fn empty_table() {
    let freq: FrequencyTable<u8> = FrequencyTable::new();
    assert_eq!(CodeTree::build(&freq).unwrap_err(),Error::EmptyInput);
}

#[test]
fn descriptor_bits() {
    let freq = FrequencyTable::from_symbols("AAABBCCA".as_bytes());
    let tree = CodeTree::build(&freq).expect("build failed");
    let mut bits = BitVec::new();
    tree.write_descriptor(&mut bits).expect("write failed");
    // 0 1'A' 0 1'B' 1'C'
    assert_eq!(bits.len(),29);
    assert_eq!(bits.to_bytes(),hex::decode("50542A18").unwrap());

    let mut ptr = 0;
    let copy: CodeTree<u8> = CodeTree::read_descriptor(&bits,&mut ptr,3).expect("read failed");
    assert_eq!(ptr,29);
    let mut again = BitVec::new();
    copy.write_descriptor(&mut again).expect("write failed");
    assert_eq!(bits,again);
}

#[test]
fn single_symbol_descriptor() {
    let freq = FrequencyTable::from_symbols(&['λ','λ']);
    let tree = CodeTree::build(&freq).expect("build failed");
    let mut bits = BitVec::new();
    tree.write_descriptor(&mut bits).expect("write failed");
    assert_eq!(bits.len(),1 + 21);
    let mut ptr = 0;
    let copy: CodeTree<char> = CodeTree::read_descriptor(&bits,&mut ptr,1).expect("read failed");
    assert_eq!(copy.node(copy.root()),Some(&Node::Stem { weight: 0, child: 0 }));
    assert_eq!(copy.node(0),Some(&Node::Leaf { symbol: 'λ', weight: 0 }));
}

#[test]
fn bad_descriptors() {
    let freq = FrequencyTable::from_symbols("AAABBCCA".as_bytes());
    let tree = CodeTree::build(&freq).expect("build failed");
    let mut bits = BitVec::new();
    tree.write_descriptor(&mut bits).expect("write failed");
    // wrong leaf counts
    for count in [0,1,2,4] {
        let mut ptr = 0;
        assert_eq!(CodeTree::<u8>::read_descriptor(&bits,&mut ptr,count).unwrap_err(),Error::CorruptContainer);
    }
    // runs out of bits
    let mut short = bits.clone();
    short.truncate(20);
    let mut ptr = 0;
    assert_eq!(CodeTree::<u8>::read_descriptor(&short,&mut ptr,3).unwrap_err(),Error::CorruptContainer);
    // same symbol twice: 0 1'A' 1'A'
    let mut dup = BitVec::new();
    dup.push(false);
    for _i in 0..2 {
        dup.push(true);
        put_code(8,b'A' as u32,&mut dup);
    }
    let mut ptr = 0;
    assert_eq!(CodeTree::<u8>::read_descriptor(&dup,&mut ptr,2).unwrap_err(),Error::CorruptContainer);
    // surrogate is not a char
    let mut surrogate = BitVec::new();
    surrogate.push(true);
    put_code(21,0xD800,&mut surrogate);
    let mut ptr = 0;
    assert_eq!(CodeTree::<char>::read_descriptor(&surrogate,&mut ptr,1).unwrap_err(),Error::CorruptContainer);
}
