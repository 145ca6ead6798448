//! Seam extraction (`build_vpath`), seam removal (`carve`), and
//! visibility-map stamping (`update_vsmap` / `finish_vsmap`).

use crate::carver::Carver;
use crate::error::{LqrError, Result};

impl Carver {
    /// Trace the minimum-cost path from the bottom row of `m` back to
    /// the top, filling `vpath`/`vpath_x` (physical index and column,
    /// per row). Uses the same tie-break policy as `build_mmap`.
    pub fn build_vpath(&mut self) -> Result<()> {
        let h = self.h as usize;
        let mut best_x = 0u32;
        let mut best_m = f32::INFINITY;
        for x in 0..self.w {
            let p = self.raw[h - 1][x as usize] as usize;
            let v = self.m[p];
            if v < best_m || (v == best_m && self.leftright) {
                best_m = v;
                best_x = x;
            }
        }
        let mut x = best_x;
        let mut y = h - 1;
        loop {
            let p = self.raw[y][x as usize];
            self.vpath[y] = p;
            self.vpath_x[y] = x;
            if y == 0 {
                break;
            }
            let target = self.least[p as usize];
            let delta_x = self.delta_x;
            let lo = (x as i32 - delta_x).max(0) as u32;
            let hi = ((x as i32 + delta_x).min(self.w as i32 - 1)) as u32;
            let mut found = None;
            for cand in lo..=hi {
                if self.raw[y - 1][cand as usize] == target {
                    found = Some(cand);
                    break;
                }
            }
            x = found.ok_or_else(|| {
                LqrError::Generic("seam tracer could not find parent column".into())
            })?;
            y -= 1;
        }
        Ok(())
    }

    /// Shift `raw[y]` left past the seam column, removing it from the
    /// visible grid. Does not touch pixel data or `vs`.
    pub fn carve(&mut self) {
        for y in 0..self.h as usize {
            let x = self.vpath_x[y] as usize;
            self.raw[y].remove(x);
        }
        self.nrg_uptodate = false;
        log::trace!("carve: removed seam, w {} -> {}", self.w, self.w - 1);
    }

    /// Stamp the visibility map: every pixel on the last-traced seam
    /// disappears at level `l`.
    pub fn update_vsmap(&mut self, l: i32) -> Result<()> {
        let mut vs = self.vs.borrow_mut();
        for y in 0..self.h as usize {
            let p = self.vpath[y] as usize;
            debug_assert_eq!(vs[p], 0, "update_vsmap: pixel already had a visibility level");
            vs[p] = l;
        }
        let w0 = self.w0;
        let h0 = self.h0;
        drop(vs);
        if self.dump_vmaps {
            let snapshot = crate::dump::VsMapSnapshot::new(w0, h0, self.vs.borrow().clone());
            self.flushed_vs.push(snapshot);
        }
        Ok(())
    }

    /// Called when `w` has reached 1: stamp the last surviving column
    /// with `w0`, marking it as "never removed".
    pub fn finish_vsmap(&mut self) {
        let mut vs = self.vs.borrow_mut();
        for y in 0..self.h as usize {
            let p = self.raw[y][0] as usize;
            vs[p] = self.w0 as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;
    use crate::types::EnergyBuiltin;

    #[test]
    fn carve_shrinks_every_row_by_one() {
        let buf = PixelBuffer::U8(vec![0; 16]);
        let mut c = Carver::new(buf, 4, 4, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.set_energy_function_builtin(EnergyBuiltin::Null).unwrap();
        c.build_emap().unwrap();
        c.build_mmap().unwrap();
        c.build_vpath().unwrap();
        c.carve();
        for row in &c.raw {
            assert_eq!(row.len(), 3);
        }
    }

    #[test]
    fn vertical_low_energy_spike_is_preserved() {
        // 1 bright pixel at (3,3) in an otherwise-black 8x8 image; a
        // gradient-based energy function should route every seam
        // around column 3.
        let mut data = vec![0u8; 64];
        data[3 * 8 + 3] = 255;
        let buf = PixelBuffer::U8(data);
        let mut c = Carver::new(buf, 8, 8, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.set_energy_function_builtin(EnergyBuiltin::GradXabs).unwrap();
        c.build_emap().unwrap();
        c.build_mmap().unwrap();
        c.build_vpath().unwrap();
        assert!(!c.vpath_x.iter().any(|&x| x == 3));
    }
}
