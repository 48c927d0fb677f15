//! Shared output surface handed between the display and the compute backend.
//!
//! While mapped, the backend writes into the surface and the presenter must
//! not read it. [`MappedSurface`] scopes the mapping so release always
//! follows acquire, including on error paths.

use crate::util::{Error, Result};

/// One RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// A mappable pixel buffer shared with a presenter.
pub trait OutputSurface {
    /// Surface size in pixels (width, height).
    fn size(&self) -> (u32, u32);

    /// Map the surface for writing.
    fn acquire(&mut self) -> Result<()>;

    /// Mapped pixel storage. Only meaningful between `acquire` and `release`.
    fn mapped_pixels(&mut self) -> &mut [Rgba8];

    /// Unmap the surface, handing it back to the presenter.
    fn release(&mut self);

    /// Pixels as last released, for display or export.
    fn pixels(&self) -> &[Rgba8];
}

/// Scoped mapping of an [`OutputSurface`]; releases on drop.
pub struct MappedSurface<'a, S: OutputSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: OutputSurface + ?Sized> MappedSurface<'a, S> {
    /// Acquire the surface. Nothing is held if acquisition fails.
    pub fn map(surface: &'a mut S) -> Result<Self> {
        surface.acquire()?;
        Ok(Self { surface })
    }

    pub fn size(&self) -> (u32, u32) {
        self.surface.size()
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba8] {
        self.surface.mapped_pixels()
    }
}

impl<S: OutputSurface + ?Sized> Drop for MappedSurface<'_, S> {
    fn drop(&mut self) {
        self.surface.release();
    }
}

/// In-memory surface used for headless runs and tests.
#[derive(Debug, Clone)]
pub struct HostSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
    mapped: bool,
    /// Completed acquire/release pairs
    map_count: u64,
}

impl HostSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; width as usize * height as usize],
            mapped: false,
            map_count: 0,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    pub fn map_count(&self) -> u64 {
        self.map_count
    }

    /// Raw bytes, row-major RGBA.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

impl OutputSurface for HostSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn acquire(&mut self) -> Result<()> {
        if self.mapped {
            return Err(Error::surface("surface is already mapped"));
        }
        if self.pixels.is_empty() {
            return Err(Error::surface("surface has no storage"));
        }
        self.mapped = true;
        Ok(())
    }

    fn mapped_pixels(&mut self) -> &mut [Rgba8] {
        debug_assert!(self.mapped, "writing to an unmapped surface");
        &mut self.pixels
    }

    fn release(&mut self) {
        if self.mapped {
            self.mapped = false;
            self.map_count += 1;
        }
    }

    fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }
}
