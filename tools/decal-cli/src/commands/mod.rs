pub mod check;
pub mod compose;
pub mod fit;
pub mod gallery;
pub mod info;

use decal_common::config::AppConfig;
use decal_model::geometry::Dimensions;

/// The stage size from the command line, or the configured default.
pub fn stage_size(config: &AppConfig, container: Option<Dimensions>) -> Dimensions {
    container.unwrap_or_else(|| {
        Dimensions::new(config.stage.container_width, config.stage.container_height)
    })
}
