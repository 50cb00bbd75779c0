use std::path::Path;

use serde::Deserialize;

use crate::error::{LayoutError, Result};
use crate::render::DEFAULT_HEIGHT_MARGIN;
use crate::types::{Dimensions, StackPolicy};

/// Pallet, item and location setup shared by the CLI and the server.
///
/// Every field may be omitted from a JSON config; missing ones fall back to
/// the reference warehouse: a 2.0 x 1.0 x 0.8 m pallet of 0.25 m cases,
/// stacked two high in an 8 x 1.2 x 2.0 m bay with 0.2 m aisles.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub pallet: Dimensions,
    pub item: Dimensions,
    pub max_stack: u32,
    pub aisle_gap: f64,
    pub location: Dimensions,
    pub height_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pallet: Dimensions::from_positive(2.0, 1.0, 0.8),
            item: Dimensions::from_positive(0.25, 1.0, 0.25),
            max_stack: 2,
            aisle_gap: 0.2,
            location: Dimensions::from_positive(8.0, 1.2, 2.0),
            height_margin: DEFAULT_HEIGHT_MARGIN,
        }
    }
}

impl LayoutConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LayoutError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw)?;
        tracing::debug!(path = %path.display(), ?config, "loaded layout config");
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.stack_policy()?;
        if !(self.height_margin >= 1.0 && self.height_margin.is_finite()) {
            return Err(LayoutError::InvalidMargin(self.height_margin));
        }
        Ok(())
    }

    pub fn stack_policy(&self) -> Result<StackPolicy> {
        StackPolicy::new(self.max_stack, self.aisle_gap)
    }
}
