//! Pack symbols into bits and walk the tree to get them back.

use bit_vec::BitVec;
use crate::symbol::Symbol;
use crate::tools::code_table::CodeTable;
use crate::tools::code_tree::{CodeTree,Node};
use crate::Error;

/// Concatenate the code of every symbol, in input order.
pub fn encode<S: Symbol>(symbols: &[S],table: &CodeTable<S>) -> Result<BitVec,Error> {
    let mut ans = BitVec::new();
    for s in symbols {
        match table.get(s) {
            Some(code) => ans.extend(code.iter()),
            None => {
                log::error!("symbol {:?} is not in the code table",s);
                return Err(Error::UnknownSymbol);
            }
        }
    }
    log::debug!("encoded {} symbols into {} bits",symbols.len(),ans.len());
    Ok(ans)
}

/// Decode every bit in `bits`.  Starting from the root, a `0` goes to the left son and
/// a `1` to the right son, reaching a leaf emits the symbol and goes back to the root.
/// Running out of bits anywhere but the root is a truncated stream.
pub fn decode<S: Symbol>(bits: &BitVec,tree: &CodeTree<S>) -> Result<Vec<S>,Error> {
    let mut ans = Vec::new();
    let root = tree.root();
    let mut curs = root;
    for bit in bits.iter() {
        curs = match (tree.node(curs),bit) {
            (Some(Node::Branch { left, .. }),false) => *left,
            (Some(Node::Branch { right, .. }),true) => *right,
            (Some(Node::Stem { child, .. }),false) => *child,
            (Some(Node::Stem { .. }),true) => {
                log::error!("bit stream takes a path with no leaf");
                return Err(Error::CorruptContainer);
            },
            _ => return Err(Error::MalformedTree)
        };
        if let Some(Node::Leaf { symbol, .. }) = tree.node(curs) {
            ans.push(*symbol);
            curs = root;
        }
    }
    if curs != root {
        log::error!("bit stream ends inside a code after {} symbols",ans.len());
        return Err(Error::TruncatedStream);
    }
    log::debug!("decoded {} bits into {} symbols",bits.len(),ans.len());
    Ok(ans)
}

#[cfg(test)]
fn setup(txt: &str) -> (CodeTree<u8>,CodeTable<u8>) {
    let freq = crate::tools::freq_table::FrequencyTable::from_symbols(txt.as_bytes());
    let tree = CodeTree::build(&freq).expect("build failed");
    let table = CodeTable::from_tree(&tree).expect("codes failed");
    (tree,table)
}

#[test]
fn encoding_works() {
    let (_tree,table) = setup("AAABBCCA");
    let bits = encode("AAABBCCA".as_bytes(),&table).expect("encoding failed");
    let expected: BitVec = "000101011110".chars().map(|c| c=='1').collect();
    assert_eq!(bits,expected);
    assert_eq!(bits.to_bytes(),hex::decode("15E0").unwrap());
}

#[test]
fn unknown_symbol() {
    let (_tree,table) = setup("AAABBCCA");
    assert_eq!(encode("ABD".as_bytes(),&table).unwrap_err(),Error::UnknownSymbol);
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let (tree,table) = setup("I am Sam. Sam I am. I do not like this Sam I am.\n");
    let bits = encode(test_data,&table).expect("encoding failed");
    assert_eq!(decode(&bits,&tree).expect("decoding failed"),test_data.to_vec());

    let (tree,table) = setup("AAAA");
    let bits = encode("AAAA".as_bytes(),&table).expect("encoding failed");
    assert_eq!(bits.len(),4);
    assert_eq!(decode(&bits,&tree).expect("decoding failed"),"AAAA".as_bytes().to_vec());
}

#[test]
fn truncated() {
    let (tree,table) = setup("AAABBCCA");
    let mut bits = encode("AAABBCCA".as_bytes(),&table).expect("encoding failed");
    // drop the trailing A and half of the C before it
    bits.truncate(10);
    assert_eq!(decode(&bits,&tree).unwrap_err(),Error::TruncatedStream);
}

#[test]
fn stem_wrong_side() {
    let (tree,_table) = setup("AAAA");
    let bits: BitVec = [false,true].into_iter().collect();
    assert_eq!(decode(&bits,&tree).unwrap_err(),Error::CorruptContainer);
}
