//! Bundled asset access.
//!
//! The launcher template ships with the packager, not with the project
//! being packaged. The [`AssetProvider`] seam keeps the packager ignorant
//! of how the template is stored; the default implementation compiles it
//! in with `include_str!`.

use anyhow::Result;

/// Name of the launcher script, both as asset and inside `bin/`.
pub const LAUNCHER_NAME: &str = "app.sh";

/// Source of bundled assets.
pub trait AssetProvider {
    /// Return the launcher script template text.
    fn launcher_template(&self) -> Result<String>;
}

/// Assets compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

impl AssetProvider for EmbeddedAssets {
    fn launcher_template(&self) -> Result<String> {
        Ok(include_str!("../assets/app.sh").to_string())
    }
}
