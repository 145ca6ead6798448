//! Enlargement: turn the visibility map's seam history into inserted
//! pixels, growing the physical buffer from `w0` to `w1`.

use crate::bias::BiasMap;
use crate::carver::Carver;
use crate::error::Result;
use crate::rigidity::RigidityMask;
use crate::state::CarverState;

impl Carver {
    /// Insert seams recorded up to level `l`, growing `w0` to
    /// `w0 + l - max_level + 1`. See `SPEC_FULL.md` §4 for the
    /// visibility-shift arithmetic this implements; it is the single
    /// hardest invariant in the whole crate.
    pub fn inflate(&mut self, l: i32) -> Result<()> {
        for aux in &mut self.attached {
            aux.inflate(l)?;
        }

        let orig_max_level = self.max_level as i32;
        let w0 = self.w0;
        let h0 = self.h0;
        let w1_signed = w0 as i32 + l - orig_max_level + 1;
        if w1_signed <= w0 as i32 {
            self.max_level = (l + 1).max(self.max_level as i32) as u32;
            return Ok(());
        }
        let w1 = w1_signed as u32;
        let channels = self.channels as usize;

        let _guard = self.state.enter(CarverState::Inflating);

        let vs_snapshot = self.vs.borrow().clone();
        let mut new_rgb = self.rgb.zeroed_like((w1 * h0) as usize * channels)?;
        let mut new_vs = if self.is_root {
            Some(crate::error::try_vec_filled(0i32, (w1 * h0) as usize)?)
        } else {
            None
        };
        let has_bias = !self.bias.is_empty();
        let mut new_bias = if has_bias {
            Some(crate::error::try_vec_filled(0.0f64, (w1 * h0) as usize)?)
        } else {
            None
        };
        let has_rigmask = !self.rigidity_mask.is_empty();
        let mut new_rigmask = if has_rigmask {
            Some(crate::error::try_vec_filled(1.0f32, (w1 * h0) as usize)?)
        } else {
            None
        };

        for y in 0..h0 {
            self.state.poll_cancelled()?;
            let mut z: usize = 0;
            for x in 0..w0 {
                let p = (y * w0 + x) as usize;
                let vs_p = vs_snapshot[p];
                if vs_p >= 2 * orig_max_level - 1 && vs_p <= l + orig_max_level - 1 {
                    let left_p = if x == 0 { p } else { (y * w0 + x - 1) as usize };
                    for ch in 0..channels {
                        let a = self.rgb.get_norm(p * channels + ch);
                        let b = self.rgb.get_norm(left_p * channels + ch);
                        new_rgb.set_norm(z * channels + ch, (a + b) / 2.0);
                    }
                    if let Some(nb) = new_bias.as_mut() {
                        nb[z] = (self.bias.at(p) + self.bias.at(left_p)) / 2.0;
                    }
                    if let Some(nr) = new_rigmask.as_mut() {
                        nr[z] = (self.rigidity_at(p) + self.rigidity_at(left_p)) / 2.0;
                    }
                    if let Some(nv) = new_vs.as_mut() {
                        nv[z] = l - vs_p + orig_max_level;
                    }
                    z += 1;
                }

                for ch in 0..channels {
                    let v = self.rgb.get_norm(p * channels + ch);
                    new_rgb.set_norm(z * channels + ch, v);
                }
                if let Some(nb) = new_bias.as_mut() {
                    nb[z] = self.bias.at(p);
                }
                if let Some(nr) = new_rigmask.as_mut() {
                    nr[z] = self.rigidity_at(p);
                }
                if let Some(nv) = new_vs.as_mut() {
                    nv[z] = if vs_p > 0 { vs_p + l - orig_max_level + 1 } else { 0 };
                }
                z += 1;
            }
            debug_assert_eq!(z, w1 as usize);
        }

        self.rgb = new_rgb;
        if let Some(nv) = new_vs {
            *self.vs.borrow_mut() = nv;
        }
        if let Some(nb) = new_bias {
            self.bias = BiasMap::from_vec(nb);
        }
        if let Some(nr) = new_rigmask {
            self.rigidity_mask = RigidityMask::from_vec(nr);
        }
        let new_len = (w1 * h0) as usize;
        self.en = crate::error::try_vec_filled(0.0f32, new_len)?;
        self.m = crate::error::try_vec_filled(0.0f32, new_len)?;
        self.least = crate::error::try_vec_filled(u32::MAX, new_len)?;
        self.nrg_uptodate = false;
        self.rcache_valid = false;
        self.level = (l + 1) as u32;
        self.max_level = (l + 1) as u32;
        self.w0 = w1;
        self.w = self.w_start;

        log::debug!("inflate: w0 {} -> {} at level {}", w0, w1, l);
        Ok(())
    }

    fn rigidity_at(&self, p: usize) -> f32 {
        if self.rigidity_mask.is_empty() {
            1.0
        } else {
            self.rigidity_mask.at(p)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;

    #[test]
    fn inflate_grows_w0_and_inserts_averaged_pixels() {
        // 1 row, 4 physical pixels: values 0,10,20,30. Mark column 1
        // as removed at the deepest already-computed level (vs=1,
        // max_level=2) so inflate(2) must insert a seam there.
        let buf = PixelBuffer::U8(vec![0, 10, 20, 30]);
        let mut c = Carver::new(buf, 4, 1, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.max_level = 2;
        c.vs.borrow_mut()[1] = 1; // 2*max_level-1 == 3? need vs in [2*ml-1, l+ml-1]
        // with max_level=2: range for l=2 is [3, 3]. Set vs[1] = 3.
        c.vs.borrow_mut()[1] = 3;
        c.inflate(2).unwrap();
        assert_eq!(c.w0, 5);
        assert_eq!(c.max_level, 3);
    }

    #[test]
    fn inflate_noop_when_l_below_max_level() {
        let buf = PixelBuffer::U8(vec![0, 10, 20, 30]);
        let mut c = Carver::new(buf, 4, 1, 1).unwrap();
        c.init(1, 0.0).unwrap();
        let w0_before = c.w0;
        c.inflate(0).unwrap();
        assert_eq!(c.w0, w0_before);
    }
}
