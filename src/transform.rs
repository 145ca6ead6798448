//! `flatten` (materialize the currently visible image as a fresh,
//! full-size buffer, discarding every level of seam history) and
//! `transpose` (swap the width/height axes so height-wise resizing can
//! reuse the same width-wise algorithms).

use crate::bias::BiasMap;
use crate::carver::Carver;
use crate::error::Result;
use crate::rigidity::{RigidityMap, RigidityMask};
use crate::state::CarverState;

impl Carver {
    /// Compact the currently visible `(w, h)` image into a new
    /// full-size buffer and forget every seam computed so far. A no-op
    /// if the carver is already at full size (`level == 1`).
    pub fn flatten(&mut self) -> Result<()> {
        for aux in &mut self.attached {
            aux.flatten()?;
        }
        if self.level == 1 {
            return Ok(());
        }

        let _guard = self.state.enter(CarverState::Flattening);
        let w = self.w;
        let h = self.h;
        let channels = self.channels as usize;

        let mut new_rgb = self.rgb.zeroed_like((w * h) as usize * channels)?;
        for y in 0..h as usize {
            for x in 0..w as usize {
                let old_p = self.raw[y][x] as usize;
                let new_p = y * w as usize + x;
                for ch in 0..channels {
                    let v = self.rgb.get_norm(old_p * channels + ch);
                    new_rgb.set_norm(new_p * channels + ch, v);
                }
            }
        }
        self.rgb = new_rgb;

        self.w_start = w;
        self.h_start = h;
        self.w0 = w;
        self.h0 = h;
        self.level = 1;
        self.max_level = 1;

        *self.vs.borrow_mut() = crate::error::try_vec_filled(0i32, (w * h) as usize)?;
        self.raw = (0..h).map(|y| (0..w).map(|x| y * w + x).collect()).collect();
        self.vpath = vec![0; h as usize];
        self.vpath_x = vec![0; h as usize];
        self.nrg_xmin = vec![0; h as usize];
        self.nrg_xmax = vec![-1; h as usize];
        self.nrg_uptodate = false;
        self.en = crate::error::try_vec_filled(0.0f32, (w * h) as usize)?;
        self.m = crate::error::try_vec_filled(0.0f32, (w * h) as usize)?;
        self.least = crate::error::try_vec_filled(u32::MAX, (w * h) as usize)?;
        self.bias = BiasMap::default();
        self.rigidity_mask = RigidityMask::default();
        self.rigidity_map = RigidityMap::build(self.rigidity, self.delta_x, h);
        self.rcache_valid = false;
        self.flushed_vs.clear();

        log::debug!("flatten: now {}x{}", w, h);
        Ok(())
    }

    /// Swap the internal width/height axes, flattening first if any
    /// seams are currently hidden. After this call `width()`/`height()`
    /// still report the same public-orientation values (the internal
    /// swap is compensated by [`Carver::orientation`]).
    pub fn transpose(&mut self) -> Result<()> {
        for aux in &mut self.attached {
            aux.transpose()?;
        }
        if self.level > 1 {
            self.flatten()?;
        }

        let _guard = self.state.enter(CarverState::Transposing);
        let w0 = self.w0;
        let h0 = self.h0;
        let channels = self.channels as usize;

        let mut new_rgb = self.rgb.zeroed_like((w0 * h0) as usize * channels)?;
        for y in 0..h0 as usize {
            for x in 0..w0 as usize {
                let old_p = y * w0 as usize + x;
                let new_p = x * h0 as usize + y;
                for ch in 0..channels {
                    let v = self.rgb.get_norm(old_p * channels + ch);
                    new_rgb.set_norm(new_p * channels + ch, v);
                }
            }
        }
        self.rgb = new_rgb;

        if !self.bias.is_empty() {
            let mut new_bias = vec![0.0f64; (w0 * h0) as usize];
            for y in 0..h0 as usize {
                for x in 0..w0 as usize {
                    let old_p = y * w0 as usize + x;
                    let new_p = x * h0 as usize + y;
                    new_bias[new_p] = self.bias.at(old_p);
                }
            }
            self.bias = BiasMap::from_vec(new_bias);
        }
        if !self.rigidity_mask.is_empty() {
            let mut new_mask = vec![1.0f32; (w0 * h0) as usize];
            for y in 0..h0 as usize {
                for x in 0..w0 as usize {
                    let old_p = y * w0 as usize + x;
                    let new_p = x * h0 as usize + y;
                    new_mask[new_p] = self.rigidity_mask.at(old_p);
                }
            }
            self.rigidity_mask = RigidityMask::from_vec(new_mask);
        }

        self.w0 = h0;
        self.h0 = w0;
        self.w_start = h0;
        self.h_start = w0;
        self.w = h0;
        self.h = w0;
        self.level = 1;
        self.max_level = 1;

        *self.vs.borrow_mut() = crate::error::try_vec_filled(0i32, (w0 * h0) as usize)?;
        self.raw = (0..self.h0).map(|y| (0..self.w0).map(|x| y * self.w0 + x).collect()).collect();
        self.vpath = vec![0; self.h0 as usize];
        self.vpath_x = vec![0; self.h0 as usize];
        self.nrg_xmin = vec![0; self.h0 as usize];
        self.nrg_xmax = vec![-1; self.h0 as usize];
        self.nrg_uptodate = false;
        self.en = crate::error::try_vec_filled(0.0f32, (w0 * h0) as usize)?;
        self.m = crate::error::try_vec_filled(0.0f32, (w0 * h0) as usize)?;
        self.least = crate::error::try_vec_filled(u32::MAX, (w0 * h0) as usize)?;
        self.rcache_valid = false;
        self.flushed_vs.clear();

        // rigidity_map is height-normalized; the height just changed
        // from h0 (old) to w0 (old), so rescale rather than rebuild.
        let factor = h0 as f32 / w0 as f32;
        self.rigidity_map.rescale(factor);

        self.transposed = !self.transposed;
        log::debug!("transpose: now {}x{} (transposed={})", self.w0, self.h0, self.transposed);
        Ok(())
    }
}
