/// Little-endian packed binary reading and writing over POD structs.
///
/// Asset payloads are sequences of `#[repr(C, packed)]` records; the reader
/// never assumes alignment and reports short data as `Error::InvalidAsset`.

use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};

/// Cursor over an immutable byte slice
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current read offset in bytes
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position == self.data.len()
    }

    /// Borrow the next `count` bytes and advance past them
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::InvalidAsset(format!(
                "Unexpected end of data: {} bytes requested at offset {}, {} available",
                count, self.position, self.remaining()
            )));
        }
        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Read one POD value
    pub fn read<T: Pod>(&mut self) -> Result<T> {
        let bytes = self.read_bytes(std::mem::size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Read `count` consecutive POD values
    pub fn read_vec<T: Pod + Zeroable>(&mut self, count: usize) -> Result<Vec<T>> {
        let size = std::mem::size_of::<T>();
        let total = count.checked_mul(size).ok_or_else(|| {
            Error::InvalidAsset(format!("Element count {} overflows", count))
        })?;
        let bytes = self.read_bytes(total)?;
        Ok(bytes.chunks_exact(size).map(bytemuck::pod_read_unaligned).collect())
    }

    /// Advance without reading
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }
}

/// Growable little-endian byte buffer
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn write<T: Pod>(&mut self, value: &T) {
        self.data.extend_from_slice(bytemuck::bytes_of(value));
    }

    pub fn write_slice<T: Pod>(&mut self, values: &[T]) {
        self.data.extend_from_slice(bytemuck::cast_slice(values));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
#[path = "binary_tests.rs"]
mod tests;
