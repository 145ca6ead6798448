//! Bias injection: additive per-pixel energy hints ("keep this region"
//! / "remove this region first") and the rigidity-mask mirror of the
//! same API.

use crate::carver::Carver;
use crate::error::{LqrError, Result};
use crate::state::CarverState;

/// Additive per-physical-pixel bias, in the same units as `en`.
/// Empty until the first injection.
#[derive(Debug, Clone, Default)]
pub struct BiasMap {
    values: Vec<f64>,
}

impl BiasMap {
    fn ensure(&mut self, len: usize) {
        if self.values.len() != len {
            self.values.resize(len, 0.0);
        }
    }

    /// Bias contribution at physical index `p`, or `0.0` if no bias
    /// has ever been injected.
    pub fn at(&self, p: usize) -> f64 {
        self.values.get(p).copied().unwrap_or(0.0)
    }

    /// Build a bias map directly from a physical-index-keyed buffer,
    /// used when rebuilding after an inflate.
    pub(crate) fn from_vec(values: Vec<f64>) -> BiasMap {
        BiasMap { values }
    }

    /// True when no bias has been injected yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Carver {
    fn require_full_size(&mut self) -> Result<()> {
        if self.level > 1 {
            self.flatten()?;
        }
        Ok(())
    }

    fn check_idle(&self) -> Result<()> {
        if self.state.get() != CarverState::Std {
            return Err(LqrError::InvalidState("carver must be idle to inject bias".into()));
        }
        Ok(())
    }

    /// Add `bias` at logical `(x, y)`. Per the reference semantics,
    /// the injected value is halved (two opposing injections at the
    /// same pixel should roughly cancel rather than double up), and
    /// requires the carver to be at its original `(w_start, h_start)`
    /// size — it flattens first if a resize has already shrunk it.
    pub fn bias_add_xy(&mut self, bias: f64, x: u32, y: u32) -> Result<()> {
        self.check_idle()?;
        self.require_full_size()?;
        let (x, y) = if self.transposed { (y, x) } else { (x, y) };
        if x >= self.w0 || y >= self.h0 {
            return Err(LqrError::InvalidArgument("bias coordinate out of range".into()));
        }
        let p = (y * self.w0 + x) as usize;
        self.bias.ensure(self.physical_len());
        self.bias.values[p] += bias / 2.0;
        Ok(())
    }

    /// Add a rectangular region of biases, clipped to the image.
    /// `factor` scales every value in `buf` (commonly `1` or `-1`).
    pub fn bias_add_area(
        &mut self,
        buf: &[f64],
        factor: i32,
        width: u32,
        height: u32,
        x_off: i32,
        y_off: i32,
    ) -> Result<()> {
        self.check_idle()?;
        self.require_full_size()?;
        for row in 0..height {
            for col in 0..width {
                let x = x_off + col as i32;
                let y = y_off + row as i32;
                if x < 0 || y < 0 || x as u32 >= self.w0 || y as u32 >= self.h0 {
                    continue;
                }
                let v = buf[(row * width + col) as usize] * factor as f64;
                self.bias_add_xy(v, x as u32, y as u32)?;
            }
        }
        Ok(())
    }

    /// Add a full-image bias buffer (`w_start * h_start` values).
    pub fn bias_add(&mut self, buf: &[f64], factor: i32) -> Result<()> {
        self.bias_add_area(buf, factor, self.w_start, self.h_start, 0, 0)
    }

    /// Like [`Carver::bias_add_area`], but reading from a raw RGB(A)
    /// byte buffer instead of a `f64` buffer: each pixel's bias is the
    /// mean of its non-alpha channels, normalized to `[-1, 1]` and
    /// scaled by `factor`.
    pub fn bias_add_rgb_area(
        &mut self,
        rgb: &[u8],
        factor: i32,
        channels: u32,
        width: u32,
        height: u32,
        x_off: i32,
        y_off: i32,
    ) -> Result<()> {
        let has_alpha = channels == 2 || channels >= 4;
        let color_channels = if has_alpha { channels - 1 } else { channels };
        let norm = 2.0 * 255.0 * color_channels as f64;
        for row in 0..height {
            for col in 0..width {
                let x = x_off + col as i32;
                let y = y_off + row as i32;
                if x < 0 || y < 0 || x as u32 >= self.w0 || y as u32 >= self.h0 {
                    continue;
                }
                let base = ((row * width + col) * channels) as usize;
                let mut sum = 0.0;
                for ch in 0..color_channels {
                    sum += rgb[base + ch as usize] as f64;
                }
                let mut bias = factor as f64 * sum / norm;
                if has_alpha {
                    bias *= rgb[base + color_channels as usize] as f64 / 255.0;
                }
                self.bias_add_xy(bias, x as u32, y as u32)?;
            }
        }
        Ok(())
    }

    /// Full-image variant of [`Carver::bias_add_rgb_area`].
    pub fn bias_add_rgb(&mut self, rgb: &[u8], factor: i32, channels: u32) -> Result<()> {
        self.bias_add_rgb_area(rgb, factor, channels, self.w_start, self.h_start, 0, 0)
    }

    /// Discard all injected bias.
    pub fn bias_clear(&mut self) {
        self.bias = BiasMap::default();
    }

    /// Add a rigidity-mask multiplier at logical `(x, y)`.
    pub fn rigmask_add_xy(&mut self, value: f64, x: u32, y: u32) -> Result<()> {
        self.check_idle()?;
        self.require_full_size()?;
        let (x, y) = if self.transposed { (y, x) } else { (x, y) };
        if x >= self.w0 || y >= self.h0 {
            return Err(LqrError::InvalidArgument("rigmask coordinate out of range".into()));
        }
        if self.rigidity_mask.is_empty() {
            self.rigidity_mask = crate::rigidity::RigidityMask::ones(self.physical_len());
        }
        let p = (y * self.w0 + x) as usize;
        self.rigidity_mask.values_mut()[p] = value as f32;
        Ok(())
    }

    /// Add a rectangular region of rigidity-mask multipliers, clipped
    /// to the image.
    pub fn rigmask_add_area(
        &mut self,
        buf: &[f64],
        width: u32,
        height: u32,
        x_off: i32,
        y_off: i32,
    ) -> Result<()> {
        for row in 0..height {
            for col in 0..width {
                let x = x_off + col as i32;
                let y = y_off + row as i32;
                if x < 0 || y < 0 || x as u32 >= self.w0 || y as u32 >= self.h0 {
                    continue;
                }
                let v = buf[(row * width + col) as usize];
                self.rigmask_add_xy(v, x as u32, y as u32)?;
            }
        }
        Ok(())
    }

    /// Discard the rigidity mask (equivalent to an all-ones mask).
    pub fn rigmask_clear(&mut self) {
        self.rigidity_mask = crate::rigidity::RigidityMask::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;

    fn tiny_carver() -> Carver {
        let buf = PixelBuffer::U8(vec![0; 16]);
        let mut c = Carver::new(buf, 4, 4, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c
    }

    #[test]
    fn bias_add_xy_halves_and_accumulates() {
        let mut c = tiny_carver();
        c.bias_add_xy(10.0, 1, 1).unwrap();
        c.bias_add_xy(10.0, 1, 1).unwrap();
        let p = (1 * c.w0 + 1) as usize;
        assert!((c.bias.at(p) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn bias_clear_resets_to_zero() {
        let mut c = tiny_carver();
        c.bias_add_xy(10.0, 1, 1).unwrap();
        c.bias_clear();
        assert_eq!(c.bias.at(5), 0.0);
    }

    #[test]
    fn rigmask_add_xy_defaults_rest_to_one() {
        let mut c = tiny_carver();
        c.rigmask_add_xy(0.5, 0, 0).unwrap();
        assert_eq!(c.rigidity_mask.at(0), 0.5);
        assert_eq!(c.rigidity_mask.at(1), 1.0);
    }
}
