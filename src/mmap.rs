//! The dynamic-programming cumulative-cost map (`m`) and its
//! incremental update.

use crate::carver::Carver;
use crate::error::Result;

const UPDATE_TOLERANCE: f32 = 1e-5;

impl Carver {
    fn best_parent(&self, y: u32, x: u32) -> (f32, u32) {
        let data = self.raw[y as usize][x as usize] as usize;
        let r_fact = if self.rigidity_mask.is_empty() { 1.0 } else { self.rigidity_mask.at(data) };
        let delta_x = self.delta_x;
        let x1_min = (-(x as i32)).max(-delta_x);
        let x1_max = ((self.w as i32 - 1 - x as i32)).min(delta_x);
        let mut best = f32::INFINITY;
        let mut best_parent = u32::MAX;
        for x1 in x1_min..=x1_max {
            let parent = self.raw[(y - 1) as usize][(x as i32 + x1) as usize];
            let mut cand = self.m[parent as usize];
            if self.rigidity != 0.0 || !self.rigidity_mask.is_empty() {
                cand += r_fact * self.rigidity_map.at(x1);
            }
            if cand < best || (cand == best && self.leftright) {
                best = cand;
                best_parent = parent;
            }
        }
        (best, best_parent)
    }

    /// Build the whole `m`/`least` map from scratch for the currently
    /// visible image. Requires `en` to be up to date.
    pub fn build_mmap(&mut self) -> Result<()> {
        for x in 0..self.w {
            let p = self.raw[0][x as usize] as usize;
            self.m[p] = self.en[p];
        }
        for y in 1..self.h {
            self.state.poll_cancelled()?;
            for x in 0..self.w {
                let data = self.raw[y as usize][x as usize] as usize;
                let (best, best_parent) = self.best_parent(y, x);
                self.m[data] = self.en[data] + best;
                self.least[data] = best_parent;
            }
        }
        log::trace!("build_mmap: {}x{} done, leftright={}", self.w, self.h, self.leftright);
        Ok(())
    }

    /// Recompute `m`/`least` only over the active interval seeded by
    /// `nrg_xmin`/`nrg_xmax`, expanding row-to-row by `delta_x` and
    /// shrinking via the early-termination "stop cell" rule: when the
    /// recomputed parent is unchanged and the new value differs by
    /// less than [`UPDATE_TOLERANCE`], the cell is left alone and, at
    /// the edges of the active interval, the interval itself shrinks.
    pub fn update_mmap(&mut self) -> Result<()> {
        let mut x_min = self.nrg_xmin[0].max(0) as u32;
        let mut x_max = self.nrg_xmax[0].min(self.w as i32 - 1);
        if x_max < 0 {
            return Ok(());
        }
        let mut x_max = x_max as u32;

        for x in x_min..=x_max {
            let p = self.raw[0][x as usize] as usize;
            self.m[p] = self.en[p];
        }

        for y in 1..self.h {
            self.state.poll_cancelled()?;
            let row_min = self.nrg_xmin[y as usize].max(0) as u32;
            let row_max_i = self.nrg_xmax[y as usize].min(self.w as i32 - 1);
            let delta = self.delta_x.max(0) as u32;
            let mut lo = x_min.saturating_sub(delta).min(row_min);
            let mut hi = (x_max + delta).min(self.w - 1).max(if row_max_i >= 0 { row_max_i as u32 } else { 0 });
            if row_max_i < 0 {
                // nothing dirty on this row; still must propagate the
                // shrinking active interval downward.
                hi = hi.min(self.w - 1);
            }
            lo = lo.min(self.w - 1);
            hi = hi.min(self.w - 1);

            let mut new_lo = lo;
            let mut new_hi = hi;
            let mut shrinking_from_left = true;
            for x in lo..=hi {
                let data = self.raw[y as usize][x as usize] as usize;
                let old_m = self.m[data];
                let old_parent = self.least[data];
                let (best, best_parent) = self.best_parent(y, x);
                let new_m = self.en[data] + best;
                let is_stop = best_parent == old_parent && (new_m - old_m).abs() < UPDATE_TOLERANCE;
                if is_stop {
                    if shrinking_from_left && x == new_lo {
                        new_lo += 1;
                    }
                } else {
                    shrinking_from_left = false;
                    self.m[data] = new_m;
                    self.least[data] = best_parent;
                    new_hi = x;
                }
            }
            if new_lo > new_hi {
                // whole row settled; collapse the interval to empty
                // for the next row's union.
                x_min = new_hi.min(new_lo);
                x_max = x_min;
            } else {
                x_min = new_lo;
                x_max = new_hi;
            }
        }
        log::trace!("update_mmap done");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;
    use crate::types::EnergyBuiltin;

    fn carver_4x3() -> Carver {
        let buf = PixelBuffer::U8(vec![0; 12]);
        let mut c = Carver::new(buf, 4, 3, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.set_energy_function_builtin(EnergyBuiltin::Null).unwrap();
        c.build_emap().unwrap();
        c
    }

    #[test]
    fn build_mmap_row0_equals_energy() {
        let mut c = carver_4x3();
        c.build_mmap().unwrap();
        for x in 0..4u32 {
            let p = c.raw[0][x as usize] as usize;
            assert_eq!(c.m[p], c.en[p]);
        }
    }

    #[test]
    fn tie_break_leftright_false_keeps_first_minimum() {
        let mut c = carver_4x3();
        // all energies zero -> every candidate ties; leftmost parent wins.
        c.leftright = false;
        c.build_mmap().unwrap();
        let p = c.raw[1][1] as usize;
        // x=1 row1: candidates x in [0,2] of row0 -> leftmost is x=0
        assert_eq!(c.least[p], c.raw[0][0]);
    }

    #[test]
    fn tie_break_leftright_true_keeps_last_minimum() {
        let mut c = carver_4x3();
        c.leftright = true;
        c.build_mmap().unwrap();
        let p = c.raw[1][1] as usize;
        assert_eq!(c.least[p], c.raw[0][2]);
    }

    #[test]
    fn update_mmap_matches_fresh_build_within_tolerance() {
        let mut c = carver_4x3();
        c.set_energy_function_builtin(EnergyBuiltin::GradXabs).unwrap();
        c.rgb = PixelBuffer::U8(vec![10, 200, 10, 250, 5, 90, 30, 70, 0, 0, 255, 10]);
        c.rcache_valid = false;
        c.build_emap().unwrap();
        c.build_mmap().unwrap();
        let fresh_m = c.m.clone();

        // simulate a seam removal's dirty interval covering everything
        for y in 0..c.h as usize {
            c.nrg_xmin[y] = 0;
            c.nrg_xmax[y] = c.w as i32 - 1;
        }
        c.update_mmap().unwrap();
        for (a, b) in fresh_m.iter().zip(c.m.iter()) {
            assert!((a - b).abs() < 1e-4);
        }
    }
}
