/// LZ4 compressed asset container.
///
/// Layout: a packed header `{format_type, format_version,
/// number_of_compressed_bytes, number_of_decompressed_bytes}` (all `u32`)
/// followed by one LZ4 block holding the format specific payload.

use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::utils::{BinaryReader, BinaryWriter};

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct MemoryFileHeader {
    format_type: u32,
    format_version: u32,
    number_of_compressed_bytes: u32,
    number_of_decompressed_bytes: u32,
}

/// Decompressed asset payload tagged with its format type and version
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryFile {
    format_type: u32,
    format_version: u32,
    data: Vec<u8>,
}

impl MemoryFile {
    pub fn new(format_type: u32, format_version: u32, data: Vec<u8>) -> Self {
        Self { format_type, format_version, data }
    }

    /// Parse and decompress a serialized memory file
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(bytes);
        let header: MemoryFileHeader = reader.read()?;
        let number_of_compressed_bytes = header.number_of_compressed_bytes as usize;
        let number_of_decompressed_bytes = header.number_of_decompressed_bytes as usize;

        if reader.remaining() != number_of_compressed_bytes {
            return Err(Error::InvalidAsset(format!(
                "Memory file declares {} compressed bytes, {} present",
                number_of_compressed_bytes, reader.remaining()
            )));
        }
        let compressed = reader.read_bytes(number_of_compressed_bytes)?;
        let data = lz4_flex::block::decompress(compressed, number_of_decompressed_bytes)
            .map_err(|e| Error::InvalidAsset(format!("LZ4 decompression failed: {}", e)))?;
        if data.len() != number_of_decompressed_bytes {
            return Err(Error::InvalidAsset(format!(
                "Memory file declares {} decompressed bytes, got {}",
                number_of_decompressed_bytes, data.len()
            )));
        }

        Ok(Self {
            format_type: header.format_type,
            format_version: header.format_version,
            data,
        })
    }

    /// Compress and serialize
    pub fn to_bytes(&self) -> Vec<u8> {
        let compressed = lz4_flex::block::compress(&self.data);
        let mut writer = BinaryWriter::new();
        writer.write(&MemoryFileHeader {
            format_type: self.format_type,
            format_version: self.format_version,
            number_of_compressed_bytes: compressed.len() as u32,
            number_of_decompressed_bytes: self.data.len() as u32,
        });
        writer.write_bytes(&compressed);
        writer.into_bytes()
    }

    /// Fail unless the file carries the expected format type and version
    pub fn validate(&self, format_type: u32, format_version: u32) -> Result<()> {
        if self.format_type != format_type {
            return Err(Error::InvalidAsset(format!(
                "Invalid format type {:#010x}, expected {:#010x}",
                self.format_type, format_type
            )));
        }
        if self.format_version != format_version {
            return Err(Error::InvalidAsset(format!(
                "Invalid format version {}, expected {}",
                self.format_version, format_version
            )));
        }
        Ok(())
    }

    pub fn format_type(&self) -> u32 {
        self.format_type
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reader over the decompressed payload
    pub fn reader(&self) -> BinaryReader<'_> {
        BinaryReader::new(&self.data)
    }
}

#[cfg(test)]
#[path = "memory_file_tests.rs"]
mod tests;
