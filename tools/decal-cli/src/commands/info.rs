//! Show image information.

use std::path::PathBuf;

use decal_common::config::AppConfig;
use decal_model::geometry::fit_within;
use decal_model::overlay::overlay_display_size;
use decal_model::source::ImageSource;
use decal_render_engine::decode;

pub async fn run(config: &AppConfig, image: PathBuf) -> anyhow::Result<()> {
    let source = ImageSource::from(image.clone());
    let intrinsic = decode::probe(&source)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", image.display()))?;
    let stage = super::stage_size(config, None);

    println!("Image: {}", source.describe());
    println!("  Intrinsic size: {intrinsic}");
    match intrinsic.aspect_ratio() {
        Some(ratio) => println!("  Aspect ratio: {ratio:.4}"),
        None => println!("  Aspect ratio: undefined"),
    }
    println!();

    println!("As base image (stage {stage}):");
    match fit_within(stage, intrinsic) {
        Some(fitted) => println!("  Display size: {fitted}"),
        None => println!("  Cannot be fitted"),
    }
    println!();

    println!(
        "As sticker (max height {}):",
        config.stage.overlay_max_height
    );
    match overlay_display_size(intrinsic, config.stage.overlay_max_height) {
        Some(size) => println!("  Display size: {size}"),
        None => println!("  Degenerate dimensions"),
    }

    Ok(())
}
