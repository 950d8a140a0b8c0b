//! Symbols of the compressed alphabet.
//!
//! A symbol is written into the tree descriptor as a fixed-width code, most
//! significant bit first.  The width depends on the kind of symbol.

use std::fmt::Debug;
use std::hash::Hash;
use num_derive::FromPrimitive;

/// Tag stored in the container identifying the kind of symbol
#[derive(FromPrimitive,Clone,Copy,Debug,PartialEq,Eq)]
pub enum SymbolKind {
    Byte = 1,
    Char = 2
}

pub trait Symbol: Copy + Eq + Ord + Hash + Debug {
    const KIND: SymbolKind;
    /// number of bits used for the symbol in the tree descriptor
    const BITS: usize;
    fn to_code(self) -> u32;
    /// `None` if the code does not correspond to a symbol
    fn from_code(code: u32) -> Option<Self>;
    /// printable form used in code listings
    fn label(&self) -> String;
}

impl Symbol for u8 {
    const KIND: SymbolKind = SymbolKind::Byte;
    const BITS: usize = 8;
    fn to_code(self) -> u32 {
        self as u32
    }
    fn from_code(code: u32) -> Option<Self> {
        u8::try_from(code).ok()
    }
    fn label(&self) -> String {
        self.escape_ascii().to_string()
    }
}

impl Symbol for char {
    const KIND: SymbolKind = SymbolKind::Char;
    const BITS: usize = 21;
    fn to_code(self) -> u32 {
        self as u32
    }
    fn from_code(code: u32) -> Option<Self> {
        char::from_u32(code)
    }
    fn label(&self) -> String {
        self.escape_debug().to_string()
    }
}

#[test]
fn invalid_codes() {
    assert_eq!(<u8 as Symbol>::from_code(0x100),None);
    assert_eq!(<char as Symbol>::from_code(0xD800),None);
    assert_eq!(<char as Symbol>::from_code(0x10FFFF),Some('\u{10FFFF}'));
    assert!(0x10FFFF < 1 << <char as Symbol>::BITS);
}

#[test]
fn labels() {
    assert_eq!(b'A'.label(),"A");
    assert_eq!(b'\n'.label(),"\\n");
    assert_eq!(0xffu8.label(),"\\xff");
    assert_eq!('é'.label(),"é");
    assert_eq!('\t'.label(),"\\t");
}
