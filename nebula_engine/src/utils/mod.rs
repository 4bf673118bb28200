//! Small shared helpers: FNV-1a hashing, string ids and packed binary I/O.

mod string_id;
mod binary;

pub use string_id::{
    StringId, fnv1a_32, string_id,
    FNV1A_32_INITIAL_HASH, FNV1A_32_PRIME,
};
pub use binary::{BinaryReader, BinaryWriter};
