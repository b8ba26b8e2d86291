//! DDS container reader for BC1/BC2/BC3 (DXT1/3/5) textures.
//!
//! Only the fields needed to slice the mip chain are interpreted; block
//! payloads are handed through untouched.
//!
//! # Layout
//! ```text
//! 0x00: magic "DDS "
//! 0x04: header (124 bytes, little-endian u32 fields at header offsets)
//!       +8  height
//!       +12 width
//!       +16 linear size (bytes in level 0)
//!       +24 mip map count
//!       +80 FourCC
//! 0x80: mip payloads, level 0 first
//! ```

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use anyhow::Context;

use crate::{
    error::{AssetError, AssetResult},
    texture::{CompressedTexture, CompressionFormat, MipLevel},
};

pub const MAGIC: [u8; 4] = *b"DDS ";

/// The interpreted subset of the 124-byte DDS header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DdsHeader {
    pub height: u32,
    pub width: u32,
    pub linear_size: u32,
    pub mip_map_count: u32,
    pub four_cc: u32,
}

impl DdsHeader {
    pub const SIZE: usize = 124;

    const HEIGHT: usize = 8;
    const WIDTH: usize = 12;
    const LINEAR_SIZE: usize = 16;
    const MIP_MAP_COUNT: usize = 24;
    const FOUR_CC: usize = 80;

    /// Read the header block (without the magic).
    pub fn parse(bytes: &[u8]) -> AssetResult<Self> {
        let block: &[u8; Self::SIZE] = bytes
            .get(..Self::SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(AssetError::TruncatedInput {
                region: "DDS header",
                needed: Self::SIZE,
                available: bytes.len(),
            })?;
        Ok(Self::from_block(block))
    }

    fn from_block(block: &[u8; Self::SIZE]) -> Self {
        let field = |at: usize| {
            u32::from_le_bytes([block[at], block[at + 1], block[at + 2], block[at + 3]])
        };
        Self {
            height: field(Self::HEIGHT),
            width: field(Self::WIDTH),
            linear_size: field(Self::LINEAR_SIZE),
            mip_map_count: field(Self::MIP_MAP_COUNT),
            four_cc: field(Self::FOUR_CC),
        }
    }

    /// Write the header block. Uninterpreted fields are zero.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&(Self::SIZE as u32).to_le_bytes());
        for (at, value) in [
            (Self::HEIGHT, self.height),
            (Self::WIDTH, self.width),
            (Self::LINEAR_SIZE, self.linear_size),
            (Self::MIP_MAP_COUNT, self.mip_map_count),
            (Self::FOUR_CC, self.four_cc),
        ] {
            bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Bytes of payload the header asks us to read: twice the linear size when mips are present.
    pub fn payload_budget(&self) -> u64 {
        let linear = u64::from(self.linear_size);
        if self.mip_map_count > 1 { 2 * linear } else { linear }
    }
}

/// Parse an in-memory DDS file.
pub fn load_dds(bytes: &[u8]) -> AssetResult<CompressedTexture> {
    let magic: [u8; 4] = bytes
        .get(..MAGIC.len())
        .and_then(|m| m.try_into().ok())
        .ok_or(AssetError::TruncatedInput {
            region: "DDS magic",
            needed: MAGIC.len(),
            available: bytes.len(),
        })?;
    check_magic(magic)?;

    let rest = &bytes[MAGIC.len()..];
    let header = DdsHeader::parse(rest)?;
    let format = CompressionFormat::from_four_cc(header.four_cc)?;

    let rest = &rest[DdsHeader::SIZE..];
    let budget = usize::try_from(header.payload_budget()).unwrap_or(usize::MAX);
    let payload = &rest[..rest.len().min(budget)];
    decode_levels(&header, format, payload)
}

/// Parse a DDS stream. Reads at most the header-declared payload; trailing bytes stay in `reader`.
pub fn load_dds_from_reader<R: Read>(mut reader: R) -> AssetResult<CompressedTexture> {
    let mut magic = [0u8; 4];
    read_region(&mut reader, &mut magic, "DDS magic")?;
    check_magic(magic)?;

    let mut block = [0u8; DdsHeader::SIZE];
    read_region(&mut reader, &mut block, "DDS header")?;
    let header = DdsHeader::from_block(&block);
    let format = CompressionFormat::from_four_cc(header.four_cc)?;

    let mut payload = Vec::new();
    reader
        .take(header.payload_budget())
        .read_to_end(&mut payload)?;
    decode_levels(&header, format, &payload)
}

/// Load a DDS file from disk.
pub fn load_dds_from_path(path: impl AsRef<Path>) -> anyhow::Result<CompressedTexture> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open DDS file: {}", path.display()))?;
    load_dds_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load DDS file: {}", path.display()))
}

fn check_magic(found: [u8; 4]) -> AssetResult<()> {
    if found != MAGIC {
        return Err(AssetError::Format { found });
    }
    Ok(())
}

/// `read_exact`, reporting a short read as truncation of the named region.
fn read_region<R: Read>(reader: &mut R, buf: &mut [u8], region: &'static str) -> AssetResult<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(AssetError::TruncatedInput {
                    region,
                    needed: buf.len(),
                    available: filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Slice the payload into mip levels.
///
/// A payload shorter than the header's budget is accepted, but a level that
/// runs past the end of what was read is corrupt.
fn decode_levels(
    header: &DdsHeader,
    format: CompressionFormat,
    payload: &[u8],
) -> AssetResult<CompressedTexture> {
    log::debug!(
        "DDS header: {}x{} {:?}, linear_size={}, mips={}",
        header.width,
        header.height,
        format,
        header.linear_size,
        header.mip_map_count
    );
    if (payload.len() as u64) < header.payload_budget() {
        log::warn!(
            "DDS payload short: header declares {} bytes, read {}",
            header.payload_budget(),
            payload.len()
        );
    }

    let mip_count = header.mip_map_count.max(1);
    let mut levels = Vec::with_capacity(mip_count.min(32) as usize);
    let mut width = header.width;
    let mut height = header.height;
    let mut offset = 0usize;
    let mut level = 0u32;

    while level < mip_count && (width > 0 || height > 0) {
        let available = payload.len() - offset;
        let size = format.level_size(width, height).ok_or(AssetError::CorruptData {
            level,
            needed: usize::MAX,
            available,
        })?;
        if size > available {
            return Err(AssetError::CorruptData {
                level,
                needed: size,
                available,
            });
        }

        log::debug!("DDS level {}: {}x{}, {} bytes", level, width, height, size);
        levels.push(MipLevel {
            index: level,
            width,
            height,
            data: payload[offset..offset + size].to_vec(),
        });

        offset += size;
        width = (width / 2).max(1);
        height = (height / 2).max(1);
        level += 1;
    }

    log::info!(
        "Loaded DDS {}x{} {:?} with {} mip levels ({} bytes)",
        header.width,
        header.height,
        format,
        levels.len(),
        offset
    );

    Ok(CompressedTexture {
        format,
        width: header.width,
        height: header.height,
        levels,
    })
}

impl CompressedTexture {
    /// Serialize back into a DDS container carrying the same levels.
    pub fn to_dds_bytes(&self) -> Vec<u8> {
        let header = DdsHeader {
            height: self.height,
            width: self.width,
            linear_size: self.levels.first().map_or(0, |l| linear_size_field(l.data.len())),
            mip_map_count: self.mip_level_count(),
            four_cc: self.format.four_cc(),
        };
        let mut bytes = Vec::with_capacity(MAGIC.len() + DdsHeader::SIZE + self.payload_len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&header.to_bytes());
        for level in &self.levels {
            bytes.extend_from_slice(&level.data);
        }
        bytes
    }
}

/// The header's linear size is 32-bit; larger level-0 payloads saturate.
fn linear_size_field(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
