//! Asset loading/parsers (meshes, textures).
//! DDS: block-compressed textures with their mip chain, passed through opaquely.
//! OBJ: triangulated meshes expanded into flat position/uv/normal streams.
//! PNG: RGBA8 textures via `image`.

pub mod dds;
pub mod error;
#[cfg(feature = "wgpu")]
pub mod gpu;
pub mod mesh;
pub mod obj;
pub mod texture;

pub use dds::{load_dds, load_dds_from_path, load_dds_from_reader};
pub use error::{AssetError, AssetResult, Attribute};
pub use mesh::{IndexedMesh, MeshVertex};
pub use obj::{load_obj_from_path, load_obj_from_reader, load_obj_from_str};
pub use texture::{CompressedTexture, CompressionFormat, MipLevel, TextureData, TextureFormat};
