//! # huffpack
//!
//! Static Huffman compression of byte or character streams.
//! The whole input is counted once, an optimal prefix-code tree is built from the counts,
//! and the symbols are packed into a bit stream.  The tree travels with the bits in a small
//! container, so expanding needs nothing but the container.
//!
//! * `huff` has the top level `compress` and `decompress`, and adapters for streams and slices
//! * `container` defines the byte layout
//! * `tools` has the individual stages (counting, tree, codes, bit packing)

mod tools;
pub mod symbol;
pub mod container;
pub mod huff;

pub use huff::{compress,decompress,Stats};
pub use symbol::{Symbol,SymbolKind};
pub use tools::code_table::CodeTable;
pub use tools::code_tree::{CodeTree,Node};
pub use tools::freq_table::FrequencyTable;

type DYNERR = Box<dyn std::error::Error>;

/// Codec Errors
#[derive(thiserror::Error,Debug,PartialEq,Eq)]
pub enum Error {
    #[error("no symbols to build a tree from")]
    EmptyInput,
    #[error("code tree is malformed")]
    MalformedTree,
    #[error("symbol has no code")]
    UnknownSymbol,
    #[error("bit stream ends inside a code")]
    TruncatedStream,
    #[error("container is corrupt")]
    CorruptContainer,
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("file too large")]
    FileTooLarge
}

/// Options controlling the stream adapters
#[derive(Clone)]
pub struct Options {
    /// whether the stream is taken as raw bytes or UTF-8 characters
    pub symbols: SymbolKind,
    /// starting position in the input file
    pub in_offset: u64,
    /// starting position in the output file
    pub out_offset: u64,
    /// return error if input is larger
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    symbols: SymbolKind::Byte,
    in_offset: 0,
    out_offset: 0,
    max_file_size: u32::MAX as u64
};
