//! Static Huffman Compression
//!
//! The whole input is counted before anything is coded, so a single tree serves
//! the entire input.  The tree is stored in the container ahead of the bits.
//!
//! * `compress` and `decompress` work on symbol slices, the symbols can be `u8` or `char`
//! * `compress_file` and `expand_file` work on streams, as selected by `Options`
//! * This transforms buffers, not files, the whole input is read before coding starts

use std::io::{Cursor,Read,Write,Seek,SeekFrom};
use crate::container::Container;
use crate::symbol::{Symbol,SymbolKind};
use crate::tools::bit_codec;
use crate::tools::code_table::CodeTable;
use crate::tools::code_tree::CodeTree;
use crate::tools::freq_table::FrequencyTable;
use crate::{DYNERR,Error,Options};

/// Sizes reported by `compress`
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Stats {
    /// number of symbols in the input
    pub original_count: usize,
    /// number of bits in the payload, not counting the tree or padding
    pub encoded_bit_length: u64
}

/// Main compression function, returns the container and its stats.
pub fn compress<S: Symbol>(symbols: &[S]) -> Result<(Vec<u8>,Stats),Error> {
    if symbols.is_empty() {
        return Err(Error::EmptyInput);
    }
    let freq = FrequencyTable::from_symbols(symbols);
    let tree = CodeTree::build(&freq)?;
    let table = CodeTable::from_tree(&tree)?;
    let payload = bit_codec::encode(symbols,&table)?;
    let stats = Stats {
        original_count: symbols.len(),
        encoded_bit_length: payload.len() as u64
    };
    let container = Container {
        symbol_count: symbols.len() as u64,
        tree,
        payload
    };
    Ok((container.to_bytes()?,stats))
}

/// Main decompression function.
pub fn decompress<S: Symbol>(container: &[u8]) -> Result<Vec<S>,Error> {
    let container: Container<S> = Container::from_bytes(container)?;
    let ans = bit_codec::decode(&container.payload,&container.tree)?;
    if ans.len() as u64 != container.symbol_count {
        log::error!("decoded {} symbols, header says {}",ans.len(),container.symbol_count);
        return Err(Error::CorruptContainer);
    }
    Ok(ans)
}

/// List the code of every symbol in a container, one `symbol:code` line each.
pub fn code_listing<S: Symbol>(container: &[u8]) -> Result<String,Error> {
    let container: Container<S> = Container::from_bytes(container)?;
    Ok(CodeTable::from_tree(&container.tree)?.listing())
}

/// Read everything from `opt.in_offset` on, checking the size limit
fn read_input<R: Read + Seek>(reader: &mut R,opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut length = reader.seek(SeekFrom::End(0))?;
    if opt.in_offset > length {
        return Err(Box::new(Error::FileFormatMismatch));
    }
    length -= opt.in_offset;
    if length > opt.max_file_size {
        return Err(Box::new(Error::FileTooLarge));
    }
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    let mut ans = Vec::new();
    reader.read_to_end(&mut ans)?;
    Ok(ans)
}

fn to_chars(dat: Vec<u8>) -> Result<Vec<char>,Error> {
    match String::from_utf8(dat) {
        Ok(s) => Ok(s.chars().collect()),
        Err(e) => {
            log::error!("input is not UTF-8: {}",e);
            Err(Error::FileFormatMismatch)
        }
    }
}

/// Compression of a stream.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn compress_file<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let dat = read_input(expanded_in,opt)?;
    let in_size = dat.len() as u64;
    let (container,stats) = match opt.symbols {
        SymbolKind::Byte => compress(&dat)?,
        SymbolKind::Char => compress(&to_chars(dat)?)?
    };
    log::debug!("{} symbols coded in {} bits",stats.original_count,stats.encoded_bit_length);
    compressed_out.seek(SeekFrom::Start(opt.out_offset))?;
    compressed_out.write_all(&container)?;
    compressed_out.flush()?;
    Ok((in_size,container.len() as u64))
}

/// Expansion of a stream.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn expand_file<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let dat = read_input(compressed_in,opt)?;
    let expanded = match opt.symbols {
        SymbolKind::Byte => decompress::<u8>(&dat)?,
        SymbolKind::Char => decompress::<char>(&dat)?.into_iter().collect::<String>().into_bytes()
    };
    expanded_out.seek(SeekFrom::Start(opt.out_offset))?;
    expanded_out.write_all(&expanded)?;
    expanded_out.flush()?;
    Ok((dat.len() as u64,expanded.len() as u64))
}

/// Convenience function, calls `compress_file` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress_file(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand_file` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand_file(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

// *************** TESTS *****************

#[test]
fn compression_works() {
    let (compressed,stats) = compress("AAABBCCA".as_bytes()).expect("compression failed");
    let expected = "48 46 01 01 08 00 00 00 00 00 00 00 0C 00 00 00 00 00 00 00 03 00 00 00 50 54 2A 18 15 E0";
    assert_eq!(compressed,hex::decode(expected.replace(" ","")).unwrap());
    assert_eq!(stats,Stats { original_count: 8, encoded_bit_length: 12 });
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let (compressed,stats) = compress(test_data).expect("compression failed");
    assert!(stats.encoded_bit_length < 8*test_data.len() as u64);
    let expanded: Vec<u8> = decompress(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data: Vec<u8> = (0..=255u8).chain(0..128u8).collect();
    let (compressed,_) = compress(&test_data).expect("compression failed");
    assert_eq!(decompress::<u8>(&compressed).expect("expansion failed"),test_data);

    let test_data: Vec<char> = "Grüße aus Köln, 東京 und ✓✓✓".chars().collect();
    let (compressed,_) = compress(&test_data).expect("compression failed");
    assert_eq!(decompress::<char>(&compressed).expect("expansion failed"),test_data);
}

#[test]
fn single_symbol() {
    let (compressed,stats) = compress("AAAA".as_bytes()).expect("compression failed");
    assert_eq!(stats.encoded_bit_length,4);
    assert_eq!(decompress::<u8>(&compressed).expect("expansion failed"),"AAAA".as_bytes().to_vec());
    assert_eq!(code_listing::<u8>(&compressed).expect("listing failed"),"A:0\n");

    let (compressed,_) = compress(&['x']).expect("compression failed");
    assert_eq!(decompress::<char>(&compressed).expect("expansion failed"),vec!['x']);
}

#[test]
fn empty_input() {
    assert_eq!(compress::<u8>(&[]).unwrap_err(),Error::EmptyInput);
    assert_eq!(compress::<char>(&[]).unwrap_err(),Error::EmptyInput);
}

#[test]
fn deterministic() {
    let test_data = "she sells sea shells by the sea shore".as_bytes();
    let (first,_) = compress(test_data).expect("compression failed");
    let (second,_) = compress(test_data).expect("compression failed");
    assert_eq!(first,second);
}

#[test]
fn corruption_is_detected() {
    let (good,_) = compress("AAABBCCA".as_bytes()).expect("compression failed");
    // last payload byte is gone
    assert_eq!(decompress::<u8>(&good[0..good.len()-1]).unwrap_err(),Error::CorruptContainer);
    // declared bit length shortened by one, the final A (a one bit code) disappears
    let mut bad = good.clone();
    bad[12] = 11;
    assert_eq!(decompress::<u8>(&bad).unwrap_err(),Error::CorruptContainer);
    // declared bit length shortened by two, ends in the middle of C
    let mut bad = good.clone();
    bad[12] = 10;
    let last = bad.len() - 1;
    bad[last] = 0xC0;
    assert_eq!(decompress::<u8>(&bad).unwrap_err(),Error::TruncatedStream);
    // declared symbol count too large
    let mut bad = good.clone();
    bad[4] = 9;
    assert_eq!(decompress::<u8>(&bad).unwrap_err(),Error::CorruptContainer);
    // decoding as the wrong symbol type
    assert_eq!(decompress::<char>(&good).unwrap_err(),Error::FileFormatMismatch);
}

#[test]
fn listing_from_container() {
    let (compressed,_) = compress(&"AAABBCCA".chars().collect::<Vec<char>>()).expect("compression failed");
    assert_eq!(code_listing::<char>(&compressed).expect("listing failed"),"A:0\nB:10\nC:11\n");
}

#[test]
fn slices_with_offsets() {
    let mut opt = crate::STD_OPTIONS;
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&opt).expect("compression failed");
    let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    // skip a 4 byte preamble on the way in, leave 2 bytes on the way out
    opt.in_offset = 4;
    opt.out_offset = 2;
    let test_data = "XXXXhello hello".as_bytes();
    let compressed = compress_slice(test_data,&opt).expect("compression failed");
    assert_eq!(compressed[0..2],[0,0]);
    assert_eq!(compressed[2..4],crate::container::SIGNATURE);
    let mut framed = b"YYYY".to_vec();
    framed.extend_from_slice(&compressed[2..]);
    let expanded = expand_slice(&framed,&opt).expect("expansion failed");
    assert_eq!(expanded,[b"\0\0".to_vec(),b"hello hello".to_vec()].concat());
}

#[test]
fn char_mode() {
    let mut opt = crate::STD_OPTIONS;
    opt.symbols = SymbolKind::Char;
    let test_data = "naïve café, naïve crêpe".as_bytes();
    let compressed = compress_slice(test_data,&opt).expect("compression failed");
    assert_eq!(compressed[3],SymbolKind::Char as u8);
    let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
    assert!(compress_slice(&[0xff,0xfe],&opt).is_err());
}

#[test]
fn size_limit() {
    let mut opt = crate::STD_OPTIONS;
    opt.max_file_size = 4;
    assert!(compress_slice("12345".as_bytes(),&opt).is_err());
    assert!(compress_slice("1234".as_bytes(),&opt).is_ok());
}
