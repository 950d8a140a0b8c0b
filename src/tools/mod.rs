//! Stages of the Huffman codec, in the order they run during compression.

pub mod freq_table;
pub mod code_tree;
pub mod code_table;
pub mod bit_codec;
