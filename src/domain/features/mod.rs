//! Feature decoding

mod decoder;

pub use decoder::decode;
