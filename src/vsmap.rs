//! `set_width` (reconstruct the visible-pixel index from the
//! visibility map at an already-computed level) and `build_maps`, the
//! driver that walks the visibility map forward to a requested depth.

use crate::carver::Carver;
use crate::error::Result;
use crate::state::CarverState;

impl Carver {
    /// Reconstruct `raw` (and `w`, `level`) for width `new_w`, reading
    /// only from the visibility map — valid for any width between
    /// `w_start - max_level + 1` and `w0` that has already been
    /// computed (or, at `w0`, trivially the full image).
    pub fn set_width(&mut self, new_w: u32) -> Result<()> {
        let level = self.w0 - new_w + 1;
        let vs = self.vs.borrow();
        let mut new_raw = Vec::with_capacity(self.h0 as usize);
        for y in 0..self.h0 {
            let mut row = Vec::with_capacity(new_w as usize);
            for x in 0..self.w0 {
                let p = (y * self.w0 + x) as usize;
                let v = vs[p];
                if v == 0 || v as u32 >= level {
                    row.push(p as u32);
                }
            }
            new_raw.push(row);
        }
        drop(vs);
        self.raw = new_raw;
        self.w = new_w;
        self.level = level;
        Ok(())
    }

    fn should_flip_leftright(&self, seams_done: u32) -> bool {
        self.lr_switch_frequency > 0 && seams_done > 0 && seams_done % self.lr_switch_frequency == 0
    }

    /// Extend the precomputed visibility map to `depth` (a target
    /// width-below-start level plus one): progressively carve seams
    /// until the logical width hits 1, then call `inflate` to record
    /// the insertion levels above `w_start`. A no-op when `depth` does
    /// not exceed what is already computed.
    pub fn build_maps(&mut self, depth: u32) -> Result<()> {
        if depth <= self.max_level {
            return Ok(());
        }
        // Reentrant with the `Resizing` guard `resize_dimension` holds
        // across its loop; when called directly (or standalone in
        // tests) this takes the real ticket lock itself, so the
        // seam-carving loop below is always cancellable.
        let _guard = self.state.enter(CarverState::Resizing);
        self.set_width(self.w_start - self.max_level + 1)?;
        if !self.nrg_uptodate {
            self.build_emap()?;
            self.build_mmap()?;
        }

        let orig_max_level = self.max_level;
        let mut l = orig_max_level;
        let mut seams_done = 0u32;
        self.progress.init(depth - orig_max_level);
        while l < depth {
            self.state.poll_cancelled()?;
            self.progress.update(l - orig_max_level, depth - orig_max_level);

            self.build_vpath()?;
            self.update_vsmap((l + orig_max_level - 1) as i32)?;
            self.level += 1;
            self.w -= 1;
            self.carve();

            if self.w > 1 {
                self.update_emap()?;
                seams_done += 1;
                if self.should_flip_leftright(seams_done) {
                    self.leftright = !self.leftright;
                    self.build_mmap()?;
                } else {
                    self.update_mmap()?;
                }
            } else {
                self.finish_vsmap();
                l += 1;
                break;
            }
            l += 1;
        }

        self.inflate((depth - 1) as i32)?;
        self.set_width(self.w_start)?;
        for aux in &mut self.attached {
            aux.set_width(self.w_start)?;
        }
        self.progress.end();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;
    use crate::types::EnergyBuiltin;

    #[test]
    fn build_maps_is_idempotent_below_current_depth() {
        let buf = PixelBuffer::U8(vec![0; 16]);
        let mut c = Carver::new(buf, 4, 4, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.set_energy_function_builtin(EnergyBuiltin::GradXabs).unwrap();
        c.build_maps(3).unwrap();
        let w0_after = c.w0;
        c.build_maps(2).unwrap();
        assert_eq!(c.w0, w0_after);
    }

    #[test]
    fn build_maps_shrinks_then_widens_back_to_w_start() {
        let buf = PixelBuffer::U8(vec![0; 16]);
        let mut c = Carver::new(buf, 4, 4, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.set_energy_function_builtin(EnergyBuiltin::GradXabs).unwrap();
        c.build_maps(3).unwrap();
        assert_eq!(c.w, c.w_start);
        assert_eq!(c.max_level, 3);
    }
}
