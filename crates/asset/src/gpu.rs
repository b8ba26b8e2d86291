//! wgpu bindings for loaded assets: texture formats, extents, vertex layouts, uploads.
//! The device must be created with `Features::TEXTURE_COMPRESSION_BC`.

use wgpu::{
    Device, Extent3d, Origin3d, Queue, Texture, TextureAspect, TextureDescriptor,
    TextureDimension, TextureUsages, VertexBufferLayout, VertexStepMode,
};

use crate::{
    mesh::{IndexedMesh, MeshVertex},
    texture::{CompressedTexture, CompressionFormat},
};

impl CompressionFormat {
    pub fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Bc1 => wgpu::TextureFormat::Bc1RgbaUnorm,
            Self::Bc2 => wgpu::TextureFormat::Bc2RgbaUnorm,
            Self::Bc3 => wgpu::TextureFormat::Bc3RgbaUnorm,
        }
    }
}

impl CompressedTexture {
    /// Level 0 extent.
    pub fn size(&self) -> Extent3d {
        Extent3d {
            width: self.width.max(1),
            height: self.height.max(1),
            depth_or_array_layers: 1,
        }
    }

    pub fn descriptor<'a>(&self, label: Option<&'a str>) -> TextureDescriptor<'a> {
        TextureDescriptor {
            label,
            size: self.size(),
            mip_level_count: self.mip_level_count().max(1),
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: self.format.wgpu_format(),
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        }
    }

    /// Create a texture and write every mip level into it.
    pub fn upload(&self, device: &Device, queue: &Queue, label: Option<&str>) -> Texture {
        let texture = device.create_texture(&self.descriptor(label));
        let format = self.format.wgpu_format();
        for level in self.levels() {
            let extent = Extent3d {
                width: level.width,
                height: level.height,
                depth_or_array_layers: 1,
            }
            .physical_size(format);
            let blocks_x = extent.width.div_ceil(4);
            log::debug!(
                "Uploading {:?} level {} ({}x{}, {} bytes)",
                format,
                level.index,
                level.width,
                level.height,
                level.data.len()
            );
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: level.index,
                    origin: Origin3d::ZERO,
                    aspect: TextureAspect::All,
                },
                &level.data,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(blocks_x * self.format.block_size() as u32),
                    rows_per_image: Some(extent.height.div_ceil(4)),
                },
                extent,
            );
        }
        texture
    }
}

impl IndexedMesh {
    pub const POSITION_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: 3 * std::mem::size_of::<f32>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
    };
    pub const UV_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: 2 * std::mem::size_of::<f32>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![1 => Float32x2],
    };
    pub const NORMAL_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: 3 * std::mem::size_of::<f32>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![2 => Float32x3],
    };
}

impl MeshVertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3],
    };
}
