//! Asset front end: loads the textures and model named on the command line
//! and logs the upload calls a renderer would issue for them.

use anyhow::Result;
use asset::{CompressedTexture, IndexedMesh, TextureData};

/// Command-line configuration.
#[derive(Debug, Default)]
struct Options {
    texture: Option<String>,
    image: Option<String>,
    model: Option<String>,
    interleave: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Options {
    // Accept: --texture=<dds> --image=<png> --model=<obj> --interleave
    let mut opts = Options::default();
    for arg in args {
        if let Some(val) = arg.strip_prefix("--texture=") {
            opts.texture = Some(val.to_owned());
        } else if let Some(val) = arg.strip_prefix("--image=") {
            opts.image = Some(val.to_owned());
        } else if let Some(val) = arg.strip_prefix("--model=") {
            opts.model = Some(val.to_owned());
        } else if arg == "--interleave" {
            opts.interleave = true;
        } else {
            log::warn!("Unknown argument '{}', ignoring.", arg);
        }
    }
    opts
}

fn report_texture(texture: &CompressedTexture) {
    for level in texture.levels() {
        log::info!(
            "upload level {}: {:?} {}x{}, {} bytes",
            level.index,
            texture.format,
            level.width,
            level.height,
            level.data.len()
        );
    }
}

fn report_image(image: &TextureData) {
    log::info!(
        "upload RGBA8 {}x{}, {} bytes",
        image.width,
        image.height,
        image.data.len()
    );
}

fn report_model(mesh: &IndexedMesh, interleave: bool) {
    if interleave {
        let vertices = mesh.interleaved();
        log::info!(
            "vertex buffer: {} interleaved vertices, {} bytes",
            vertices.len(),
            std::mem::size_of_val(vertices.as_slice())
        );
        return;
    }
    log::info!("vertex buffer: {} bytes (3 floats/corner)", mesh.vertex_bytes().len());
    log::info!("uv buffer: {} bytes (2 floats/corner)", mesh.uv_bytes().len());
    log::info!("normal buffer: {} bytes (3 floats/corner)", mesh.normal_bytes().len());
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = parse_args(std::env::args().skip(1));
    if opts.texture.is_none() && opts.image.is_none() && opts.model.is_none() {
        log::info!("usage: app [--texture=<file.dds>] [--image=<file.png>] [--model=<file.obj>] [--interleave]");
        return Ok(());
    }

    if let Some(path) = &opts.texture {
        report_texture(&asset::load_dds_from_path(path)?);
    }
    if let Some(path) = &opts.image {
        report_image(&TextureData::load_png(path)?);
    }
    if let Some(path) = &opts.model {
        report_model(&asset::load_obj_from_path(path)?, opts.interleave);
    }

    log::info!("All assets loaded.");
    Ok(())
}
