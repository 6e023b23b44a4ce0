//! Empty latent allocation.
//!
//! Maps pixel dimensions to a `[batch, channels, height / scale, width / scale]` latent
//! shape. The shape computation itself is pure and infallible; [`StandardLatentAllocator`]
//! validates its settings before using it.

use crate::core::config::LatentSettings;
use crate::core::error::{LatentCatalogError, Result};
use serde::Serialize;
use std::fmt;
use std::num::NonZeroU32;

/// Channel count of the hard-coded last-resort latent
pub const MINIMAL_CHANNELS: u32 = 4;
/// Spatial size of the hard-coded last-resort latent
pub const MINIMAL_SPATIAL: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatentShape {
    pub batch_size: u32,
    pub channels: u32,
    pub height: u32,
    pub width: u32,
}

impl LatentShape {
    pub fn dims(&self) -> [usize; 4] {
        [
            self.batch_size as usize,
            self.channels as usize,
            self.height as usize,
            self.width as usize,
        ]
    }

    pub fn element_count(&self) -> usize {
        self.dims().iter().product()
    }
}

impl fmt::Display for LatentShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.batch_size, self.channels, self.height, self.width
        )
    }
}

/// Latent shape for an image, using integer floor division.
pub fn latent_shape(
    width: u32,
    height: u32,
    batch_size: u32,
    channels: u32,
    scale_factor: NonZeroU32,
) -> LatentShape {
    LatentShape {
        batch_size,
        channels,
        height: height / scale_factor,
        width: width / scale_factor,
    }
}

/// Zero-filled latent block, described by its shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyLatent {
    pub shape: LatentShape,
}

impl EmptyLatent {
    /// Last-resort latent that never depends on configuration
    pub fn minimal(batch_size: u32) -> Self {
        Self {
            shape: LatentShape {
                batch_size: batch_size.max(1),
                channels: MINIMAL_CHANNELS,
                height: MINIMAL_SPATIAL,
                width: MINIMAL_SPATIAL,
            },
        }
    }

    /// Materialise the zero-filled samples in row-major order.
    pub fn samples(&self) -> Vec<f32> {
        vec![0.0; self.shape.element_count()]
    }
}

pub trait LatentAllocator {
    fn allocate(&self, width: u32, height: u32, batch_size: u32) -> Result<EmptyLatent>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardLatentAllocator {
    channels: u32,
    scale_factor: u32,
}

impl StandardLatentAllocator {
    pub fn new(channels: u32, scale_factor: u32) -> Self {
        Self {
            channels,
            scale_factor,
        }
    }

    pub fn from_settings(settings: &LatentSettings) -> Self {
        Self::new(settings.channels, settings.scale_factor)
    }
}

impl Default for StandardLatentAllocator {
    fn default() -> Self {
        Self::from_settings(&LatentSettings::default())
    }
}

impl LatentAllocator for StandardLatentAllocator {
    fn allocate(&self, width: u32, height: u32, batch_size: u32) -> Result<EmptyLatent> {
        let scale = NonZeroU32::new(self.scale_factor)
            .ok_or_else(|| LatentCatalogError::invalid_latent_settings("scale_factor is 0"))?;
        if self.channels == 0 {
            return Err(LatentCatalogError::invalid_latent_settings("channels is 0"));
        }
        if batch_size == 0 {
            return Err(LatentCatalogError::invalid_latent_settings("batch_size is 0"));
        }

        let shape = latent_shape(width, height, batch_size, self.channels, scale);
        if shape.width == 0 || shape.height == 0 {
            return Err(LatentCatalogError::invalid_latent_settings(format!(
                "{width}x{height} is smaller than the scale factor {scale}"
            )));
        }

        log::debug!("Allocated empty latent {shape} for {width}x{height}");
        Ok(EmptyLatent { shape })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latent_shape_floor_division() {
        let scale = NonZeroU32::new(8).unwrap();
        let shape = latent_shape(1216, 836, 2, 4, scale);
        assert_eq!(shape.dims(), [2, 4, 104, 152]);
    }

    #[test]
    fn test_standard_allocator() -> Result<()> {
        let latent = StandardLatentAllocator::default().allocate(1024, 768, 3)?;
        assert_eq!(latent.shape.to_string(), "[3, 4, 96, 128]");
        assert_eq!(latent.shape.element_count(), 3 * 4 * 96 * 128);
        Ok(())
    }

    #[test]
    fn test_samples_are_zero_filled() -> Result<()> {
        let latent = StandardLatentAllocator::new(16, 8).allocate(64, 64, 1)?;
        let samples = latent.samples();
        assert_eq!(samples.len(), 16 * 8 * 8);
        assert!(samples.iter().all(|v| *v == 0.0));
        Ok(())
    }

    #[test]
    fn test_zero_scale_factor_is_an_error() {
        let result = StandardLatentAllocator::new(4, 0).allocate(1024, 1024, 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_image_smaller_than_scale_is_an_error() {
        let result = StandardLatentAllocator::new(4, 8).allocate(4, 1024, 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_minimal_latent() {
        let latent = EmptyLatent::minimal(0);
        assert_eq!(latent.shape.dims(), [1, 4, 128, 128]);
    }
}
