//! Container Format
//!
//! The container holds everything needed to expand the data.
//! All integers are little endian.
//!
//! * bytes 0-1: signature `HF`
//! * byte 2: format version
//! * byte 3: symbol kind, 1 for bytes, 2 for characters
//! * bytes 4-11: number of symbols in the original data
//! * bytes 12-19: number of bits in the payload
//! * bytes 20-23: number of leaves in the code tree
//! * tree descriptor, padded with zero bits to the next byte
//! * payload, padded with zero bits to the next byte
//!
//! The payload bit count is what separates the padding from the last code,
//! the container is rejected if it disagrees with the number of payload bytes.

use bit_vec::BitVec;
use num_traits::FromPrimitive;
use crate::symbol::{Symbol,SymbolKind};
use crate::tools::code_tree::CodeTree;
use crate::Error;

pub const SIGNATURE: [u8;2] = [b'H',b'F'];
pub const VERSION: u8 = 1;
pub const HEADER_LEN: usize = 24;

/// Tree and payload, plus the count of symbols they encode
pub struct Container<S: Symbol> {
    pub symbol_count: u64,
    pub tree: CodeTree<S>,
    pub payload: BitVec
}

fn le_u64(dat: &[u8]) -> u64 {
    let mut buf: [u8;8] = [0;8];
    buf.copy_from_slice(&dat[0..8]);
    u64::from_le_bytes(buf)
}

fn le_u32(dat: &[u8]) -> u32 {
    let mut buf: [u8;4] = [0;4];
    buf.copy_from_slice(&dat[0..4]);
    u32::from_le_bytes(buf)
}

/// Check that bits from `start` to the end of `bits` are all zero
fn padding_is_clear(bits: &BitVec,start: usize) -> bool {
    (start..bits.len()).all(|i| bits.get(i) == Some(false))
}

impl <S: Symbol> Container<S> {
    pub fn bit_length(&self) -> u64 {
        self.payload.len() as u64
    }
    pub fn to_bytes(&self) -> Result<Vec<u8>,Error> {
        let mut ans = Vec::new();
        ans.extend_from_slice(&SIGNATURE);
        ans.push(VERSION);
        ans.push(S::KIND as u8);
        ans.extend_from_slice(&u64::to_le_bytes(self.symbol_count));
        ans.extend_from_slice(&u64::to_le_bytes(self.bit_length()));
        ans.extend_from_slice(&u32::to_le_bytes(self.tree.leaf_count() as u32));
        let mut descriptor = BitVec::new();
        self.tree.write_descriptor(&mut descriptor)?;
        ans.append(&mut descriptor.to_bytes());
        ans.append(&mut self.payload.to_bytes());
        log::debug!("container has {} bytes, tree descriptor has {} bits",ans.len(),descriptor.len());
        Ok(ans)
    }
    pub fn from_bytes(dat: &[u8]) -> Result<Self,Error> {
        if dat.len() < HEADER_LEN {
            log::error!("container is only {} bytes",dat.len());
            return Err(Error::CorruptContainer);
        }
        if dat[0..2] != SIGNATURE || dat[2] != VERSION {
            log::error!("signature or version not recognized");
            return Err(Error::CorruptContainer);
        }
        match SymbolKind::from_u8(dat[3]) {
            Some(kind) if kind == S::KIND => {},
            Some(kind) => {
                log::error!("container holds {:?} symbols, expected {:?}",kind,S::KIND);
                return Err(Error::FileFormatMismatch);
            },
            None => {
                log::error!("unknown symbol kind {}",dat[3]);
                return Err(Error::CorruptContainer);
            }
        }
        let symbol_count = le_u64(&dat[4..]);
        let bit_length = le_u64(&dat[12..]);
        let leaf_count = le_u32(&dat[20..]) as usize;
        // every symbol needs at least one bit
        if symbol_count == 0 || symbol_count > bit_length {
            log::error!("{} symbols cannot be coded in {} bits",symbol_count,bit_length);
            return Err(Error::CorruptContainer);
        }
        let rest = BitVec::from_bytes(&dat[HEADER_LEN..]);
        let mut ptr = 0;
        let tree = CodeTree::read_descriptor(&rest,&mut ptr,leaf_count)?;
        let descriptor_bytes = ptr/8 + usize::from(ptr%8 > 0);
        if (ptr..8*descriptor_bytes).any(|i| rest.get(i) == Some(true)) {
            log::error!("tree descriptor padding is not zero");
            return Err(Error::CorruptContainer);
        }
        let payload_bytes = &dat[HEADER_LEN+descriptor_bytes..];
        let expected_bytes = bit_length/8 + u64::from(bit_length%8 > 0);
        if payload_bytes.len() as u64 != expected_bytes {
            log::error!("payload has {} bytes, but {} bits requires {}",payload_bytes.len(),bit_length,expected_bytes);
            return Err(Error::CorruptContainer);
        }
        let mut payload = BitVec::from_bytes(payload_bytes);
        if !padding_is_clear(&payload,bit_length as usize) {
            log::error!("payload padding is not zero");
            return Err(Error::CorruptContainer);
        }
        payload.truncate(bit_length as usize);
        Ok(Self {
            symbol_count,
            tree,
            payload
        })
    }
}

#[cfg(test)]
fn sample() -> Vec<u8> {
    let test_data = "AAABBCCA".as_bytes();
    let freq = crate::tools::freq_table::FrequencyTable::from_symbols(test_data);
    let tree = CodeTree::build(&freq).expect("build failed");
    let table = crate::tools::code_table::CodeTable::from_tree(&tree).expect("codes failed");
    let payload = crate::tools::bit_codec::encode(test_data,&table).expect("encoding failed");
    let container = Container { symbol_count: 8, tree, payload };
    container.to_bytes().expect("serialization failed")
}

#[test]
fn layout() {
    let expected = "48 46 01 01 08 00 00 00 00 00 00 00 0C 00 00 00 00 00 00 00 03 00 00 00 50 54 2A 18 15 E0";
    assert_eq!(sample(),hex::decode(expected.replace(" ","")).unwrap());
    let parsed: Container<u8> = Container::from_bytes(&sample()).expect("parse failed");
    assert_eq!(parsed.symbol_count,8);
    assert_eq!(parsed.bit_length(),12);
    assert_eq!(parsed.tree.leaf_count(),3);
}

#[test]
fn header_errors() {
    let good = sample();
    assert_eq!(Container::<u8>::from_bytes(&good[0..20]).err(),Some(Error::CorruptContainer));
    let mut bad = good.clone();
    bad[0] = b'h';
    assert_eq!(Container::<u8>::from_bytes(&bad).err(),Some(Error::CorruptContainer));
    let mut bad = good.clone();
    bad[2] = 2;
    assert_eq!(Container::<u8>::from_bytes(&bad).err(),Some(Error::CorruptContainer));
    let mut bad = good.clone();
    bad[3] = 9;
    assert_eq!(Container::<u8>::from_bytes(&bad).err(),Some(Error::CorruptContainer));
    assert_eq!(Container::<char>::from_bytes(&good).err(),Some(Error::FileFormatMismatch));
    let mut bad = good.clone();
    bad[20] = 4;
    assert_eq!(Container::<u8>::from_bytes(&bad).err(),Some(Error::CorruptContainer));
}

#[test]
fn payload_errors() {
    let good = sample();
    // missing byte
    assert_eq!(Container::<u8>::from_bytes(&good[0..good.len()-1]).err(),Some(Error::CorruptContainer));
    // extra byte
    let mut bad = good.clone();
    bad.push(0);
    assert_eq!(Container::<u8>::from_bytes(&bad).err(),Some(Error::CorruptContainer));
    // bit length says 17 bits but there are only 2 bytes
    let mut bad = good.clone();
    bad[12] = 17;
    assert_eq!(Container::<u8>::from_bytes(&bad).err(),Some(Error::CorruptContainer));
    // bit set in the payload padding
    let mut bad = good.clone();
    let last = bad.len() - 1;
    bad[last] |= 0x01;
    assert_eq!(Container::<u8>::from_bytes(&bad).err(),Some(Error::CorruptContainer));
    // bit set in the descriptor padding
    let mut bad = good.clone();
    bad[27] |= 0x01;
    assert_eq!(Container::<u8>::from_bytes(&bad).err(),Some(Error::CorruptContainer));
}
