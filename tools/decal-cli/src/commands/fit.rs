//! Show how an image fits the stage.

use std::path::PathBuf;

use decal_common::config::AppConfig;
use decal_model::geometry::{fit_within, Dimensions};
use decal_model::source::ImageSource;
use decal_render_engine::decode;

pub async fn run(
    config: &AppConfig,
    image: PathBuf,
    container: Option<Dimensions>,
) -> anyhow::Result<()> {
    let stage = super::stage_size(config, container);
    let intrinsic = decode::probe(&ImageSource::from(image.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", image.display()))?;

    let fitted = fit_within(stage, intrinsic)
        .ok_or_else(|| anyhow::anyhow!("Cannot fit {intrinsic} into a {stage} stage"))?;

    println!("Image:   {intrinsic}");
    println!("Stage:   {stage}");
    println!("Display: {}x{}", fitted.width, fitted.height);
    if let Some((w, h)) = fitted.surface_pixels() {
        println!("Export:  {w}x{h} px");
    }

    Ok(())
}
