//! Texture data structures.
//! Block-compressed textures come from the DDS reader; plain RGBA8 textures from PNG files.

use std::path::Path;

use crate::error::{AssetError, AssetResult};

/// Block compression formats understood by the DDS reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompressionFormat {
    /// DXT1: 8 bytes per 4x4 block.
    Bc1,
    /// DXT3: 16 bytes per 4x4 block, explicit alpha.
    Bc2,
    /// DXT5: 16 bytes per 4x4 block, interpolated alpha.
    Bc3,
}

impl CompressionFormat {
    pub const DXT1: u32 = u32::from_le_bytes(*b"DXT1");
    pub const DXT3: u32 = u32::from_le_bytes(*b"DXT3");
    pub const DXT5: u32 = u32::from_le_bytes(*b"DXT5");

    /// Map a header FourCC onto a format. The mapping is closed: anything else is rejected.
    pub fn from_four_cc(tag: u32) -> AssetResult<Self> {
        match tag {
            Self::DXT1 => Ok(Self::Bc1),
            Self::DXT3 => Ok(Self::Bc2),
            Self::DXT5 => Ok(Self::Bc3),
            _ => Err(AssetError::UnsupportedFormat { tag }),
        }
    }

    pub fn four_cc(self) -> u32 {
        match self {
            Self::Bc1 => Self::DXT1,
            Self::Bc2 => Self::DXT3,
            Self::Bc3 => Self::DXT5,
        }
    }

    /// Bytes per 4x4 block.
    pub fn block_size(self) -> usize {
        match self {
            Self::Bc1 => 8,
            Self::Bc2 | Self::Bc3 => 16,
        }
    }

    /// Payload size of a `width`x`height` level, rounded up to whole blocks.
    /// Returns `None` if the size does not fit in `usize`.
    pub fn level_size(self, width: u32, height: u32) -> Option<usize> {
        let blocks_x = (width as usize).div_ceil(4);
        let blocks_y = (height as usize).div_ceil(4);
        blocks_x
            .checked_mul(blocks_y)?
            .checked_mul(self.block_size())
    }
}

/// One mip level, ready for a compressed-texture upload call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MipLevel {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Block-compressed texture with its full mip chain. Block contents are opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedTexture {
    pub format: CompressionFormat,
    pub width: u32,
    pub height: u32,
    pub(crate) levels: Vec<MipLevel>,
}

impl CompressedTexture {
    /// Build a texture from raw level payloads, level 0 first.
    ///
    /// Each payload must match [`CompressionFormat::level_size`] for its
    /// halved (minimum 1) dimensions.
    pub fn from_levels(
        format: CompressionFormat,
        width: u32,
        height: u32,
        payloads: Vec<Vec<u8>>,
    ) -> AssetResult<Self> {
        let mut levels = Vec::with_capacity(payloads.len());
        for (index, data) in payloads.into_iter().enumerate() {
            let index = index as u32;
            let (w, h) = level_dimensions(width, height, index);
            let needed = format
                .level_size(w, h)
                .ok_or(AssetError::CorruptData {
                    level: index,
                    needed: usize::MAX,
                    available: data.len(),
                })?;
            if data.len() != needed {
                return Err(AssetError::CorruptData {
                    level: index,
                    needed,
                    available: data.len(),
                });
            }
            levels.push(MipLevel {
                index,
                width: w,
                height: h,
                data,
            });
        }
        Ok(Self {
            format,
            width,
            height,
            levels,
        })
    }

    /// Mip levels in upload order.
    pub fn levels(&self) -> impl ExactSizeIterator<Item = &MipLevel> {
        self.levels.iter()
    }

    pub fn level(&self, index: u32) -> Option<&MipLevel> {
        self.levels.get(index as usize)
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Sum of all level payload sizes.
    pub fn payload_len(&self) -> usize {
        self.levels.iter().map(|l| l.data.len()).sum()
    }

    pub fn into_levels(self) -> Vec<MipLevel> {
        self.levels
    }
}

/// Dimensions of mip `level`: halved per level, clamped to at least 1.
pub fn level_dimensions(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shift = level.min(31);
    ((width >> shift).max(1), (height >> shift).max(1))
}

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Uncompressed texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> AssetResult<Self> {
        let needed = width as usize * height as usize * 4;
        if data.len() != needed {
            return Err(AssetError::CorruptData {
                level: 0,
                needed,
                available: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
        })
    }

    /// Load texture from PNG file.
    pub fn load_png<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open image {:?}: {}", path, e))?;

        let texture = Self::from_image(img)?;
        log::info!(
            "Loaded texture {}x{} with {} bytes",
            texture.width,
            texture.height,
            texture.data.len()
        );
        Ok(texture)
    }

    /// Decode an in-memory PNG.
    pub fn from_png_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| anyhow::anyhow!("Failed to decode PNG: {}", e))?;
        Ok(Self::from_image(img)?)
    }

    fn from_image(img: image::DynamicImage) -> AssetResult<Self> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new_rgba8(width, height, rgba.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_cc_mapping_is_closed() {
        assert_eq!(CompressionFormat::from_four_cc(0x3154_5844).unwrap(), CompressionFormat::Bc1);
        assert_eq!(CompressionFormat::from_four_cc(0x3354_5844).unwrap(), CompressionFormat::Bc2);
        assert_eq!(CompressionFormat::from_four_cc(0x3554_5844).unwrap(), CompressionFormat::Bc3);
        // DXT2/DXT4 are premultiplied variants we do not map.
        for tag in [b"DXT2", b"DXT4", b"ATI2", b"\0\0\0\0"] {
            let raw = u32::from_le_bytes(*tag);
            assert!(matches!(
                CompressionFormat::from_four_cc(raw),
                Err(AssetError::UnsupportedFormat { tag }) if tag == raw
            ));
        }
    }

    #[test]
    fn level_size_rounds_up_to_blocks() {
        assert_eq!(CompressionFormat::Bc1.level_size(256, 256), Some(64 * 64 * 8));
        assert_eq!(CompressionFormat::Bc3.level_size(30, 30), Some(8 * 8 * 16));
        assert_eq!(CompressionFormat::Bc2.level_size(1, 1), Some(16));
        assert_eq!(CompressionFormat::Bc1.level_size(0, 8), Some(0));
    }

    #[test]
    fn level_dimensions_clamp_to_one() {
        assert_eq!(level_dimensions(64, 16, 0), (64, 16));
        assert_eq!(level_dimensions(64, 16, 3), (8, 2));
        assert_eq!(level_dimensions(64, 16, 5), (2, 1));
        assert_eq!(level_dimensions(64, 16, 40), (1, 1));
    }

    #[test]
    fn from_levels_rejects_wrong_payload_size() {
        let err = CompressedTexture::from_levels(
            CompressionFormat::Bc1,
            8,
            8,
            vec![vec![0; 32], vec![0; 7]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AssetError::CorruptData { level: 1, needed: 8, available: 7 }
        ));
    }

    #[test]
    fn png_bytes_decode_to_rgba8() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let tex = TextureData::from_png_bytes(png.get_ref()).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(tex.format, TextureFormat::Rgba8);
        assert_eq!(tex.data.len(), 3 * 2 * 4);
        assert_eq!(tex.data[4..8], [10, 20, 30, 255]);
    }

    #[test]
    fn rgba8_size_mismatch_is_error() {
        assert!(TextureData::new_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(TextureData::new_rgba8(2, 2, vec![0; 16]).is_ok());
    }
}
