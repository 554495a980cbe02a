//! Runtime configuration for the GUI core.
//!
//! Boards ship the configuration as a postcard blob next to the firmware
//! image; tests and the simulator build it in code.

use alloc::vec::Vec;
use embedded_graphics::pixelcolor::Rgb565;
use serde::{Deserialize, Serialize};
use log::warn;
use thiserror_no_std::Error;

use crate::ui::draw::color::color_hex;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration blob could not be decoded")]
    Decode,

    #[error("Configuration could not be encoded")]
    Encode,

    #[error("Invalid resolution {hor}x{ver}")]
    InvalidResolution { hor: u16, ver: u16 },
}

/// Order in which the compositor walks a blend region.
///
/// Both orders produce identical pixels; vertical suits panels mounted in
/// portrait with a landscape scan direction.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendWalk {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiConfig {
    pub hor_res: u16,
    pub ver_res: u16,
    /// Bytes available to objects, styles and dynamic arrays.
    pub mem_capacity: u32,
    pub blend_walk: BlendWalk,
    /// Corner radius given to freshly created objects.
    pub default_radius: u16,
    /// Outline color for focused widgets, `0xRRGGBB`.
    pub focus_color: u32,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            hor_res: 320,
            ver_res: 240,
            mem_capacity: 64 * 1024,
            blend_walk: BlendWalk::Horizontal,
            default_radius: 4,
            focus_color: 0x3C_C8_D2,
        }
    }
}

impl GuiConfig {
    pub fn with_resolution(mut self, hor_res: u16, ver_res: u16) -> Self {
        self.hor_res = hor_res;
        self.ver_res = ver_res;
        self
    }

    pub fn with_mem_capacity(mut self, bytes: u32) -> Self {
        self.mem_capacity = bytes;
        self
    }

    pub fn with_blend_walk(mut self, walk: BlendWalk) -> Self {
        self.blend_walk = walk;
        self
    }

    pub fn focus_color(&self) -> Rgb565 {
        color_hex(self.focus_color)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hor_res == 0 || self.ver_res == 0 {
            return Err(ConfigError::InvalidResolution {
                hor: self.hor_res,
                ver: self.ver_res,
            });
        }
        Ok(())
    }

    /// Decode and validate a postcard blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: GuiConfig = postcard::from_bytes(bytes).map_err(|e| {
            warn!("Config decode failed: {:?}", e);
            ConfigError::Decode
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_survives_encoding() {
        let config = GuiConfig::default()
            .with_resolution(800, 480)
            .with_blend_walk(BlendWalk::Vertical);
        let blob = config.to_vec().unwrap();
        assert_eq!(GuiConfig::from_bytes(&blob).unwrap(), config);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let blob = GuiConfig::default().with_resolution(0, 240).to_vec().unwrap();
        assert!(matches!(
            GuiConfig::from_bytes(&blob),
            Err(ConfigError::InvalidResolution { hor: 0, ver: 240 })
        ));
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let blob = GuiConfig::default().to_vec().unwrap();
        assert!(matches!(
            GuiConfig::from_bytes(&blob[..2]),
            Err(ConfigError::Decode)
        ));
    }
}
