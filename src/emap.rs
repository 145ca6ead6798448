//! Energy map construction: `build_emap` (full) and `update_emap`
//! (incremental, after a single seam removal).

use crate::carver::Carver;
use crate::energy::{compute_builtin, read_brightness, read_custom, read_luma, read_rgba};
use crate::error::Result;
use crate::rwindow::{RWindow, SampleSource};
use crate::types::ReaderType;

impl Carver {
    pub(crate) fn reader_channels(&self) -> u32 {
        match self.reader_type {
            ReaderType::Brightness | ReaderType::Luma => 1,
            ReaderType::Rgba => 4,
            ReaderType::Custom => self.channels,
        }
    }

    fn reader_scalar(&self, p: usize, ch: u32) -> f64 {
        match self.reader_type {
            ReaderType::Brightness => {
                read_brightness(&self.rgb, p, self.channels, self.image_type, self.alpha_channel, self.black_channel)
            }
            ReaderType::Luma => {
                read_luma(&self.rgb, p, self.channels, self.image_type, self.alpha_channel, self.black_channel)
            }
            ReaderType::Rgba => read_rgba(&self.rgb, p, self.channels, ch),
            ReaderType::Custom => read_custom(&self.rgb, p, self.channels, ch),
        }
    }

    fn ensure_rcache(&mut self) {
        if !self.use_cache {
            return;
        }
        if self.rcache_valid {
            return;
        }
        let rc = self.reader_channels();
        let mut cache = vec![0.0f64; self.physical_len() * rc as usize];
        for y in 0..self.h {
            for x in 0..self.w {
                let p = self.raw[y as usize][x as usize] as usize;
                for ch in 0..rc {
                    cache[p * rc as usize + ch as usize] = self.reader_scalar(p, ch);
                }
            }
        }
        self.rcache = cache;
        self.rcache_valid = true;
    }

    fn energy_at(&self, win: &RWindow, x: u32, y: u32) -> f64 {
        match &self.energy_fn {
            Some(f) => {
                let snapshot = win.materialize(self);
                f(x, y, self.w, self.h, &snapshot, &self.energy_extra)
            }
            None => compute_builtin(self.energy_builtin, win, self, x, y, self.w, self.h),
        }
    }

    /// Recompute the whole energy map for the currently visible
    /// image. Cancellation is polled once per row.
    pub fn build_emap(&mut self) -> Result<()> {
        self.ensure_rcache();
        let rc = self.reader_channels();
        let mut win = RWindow::new(self.reader_radius, rc, self.use_cache);
        for y in 0..self.h {
            self.state.poll_cancelled()?;
            for x in 0..self.w {
                win.fill(self, x, y);
                let p = self.raw[y as usize][x as usize] as usize;
                let mut e = self.energy_at(&win, x, y);
                if !self.bias.is_empty() {
                    e += self.bias.at(p) / self.w_start as f64;
                }
                self.en[p] = e as f32;
            }
        }
        self.nrg_uptodate = true;
        log::trace!("build_emap: {}x{} done", self.w, self.h);
        Ok(())
    }

    /// Recompute only the dirty interval of the energy map after a
    /// seam removal, per `nrg_xmin`/`nrg_xmax` and `nrg_radius`
    /// (`delta_x`).
    pub fn update_emap(&mut self) -> Result<()> {
        let r = self.reader_radius;
        let h = self.h as i32;
        for y in 0..self.h {
            let vx = self.vpath_x[y as usize] as i32;
            let xmin = (vx - r).max(0);
            let xmax = (vx + r - 1).min(self.w as i32 - 1);
            self.nrg_xmin[y as usize] = xmin;
            self.nrg_xmax[y as usize] = xmax;
        }
        // union with the radius-neighborhood of rows y +/- r
        let base = self.nrg_xmin.clone();
        let basemax = self.nrg_xmax.clone();
        for y in 0..self.h as i32 {
            let mut xmin = base[y as usize];
            let mut xmax = basemax[y as usize];
            for dy in 1..=r {
                if y - dy >= 0 {
                    xmin = xmin.min(base[(y - dy) as usize]);
                    xmax = xmax.max(basemax[(y - dy) as usize]);
                }
                if y + dy < h {
                    xmin = xmin.min(base[(y + dy) as usize]);
                    xmax = xmax.max(basemax[(y + dy) as usize]);
                }
            }
            self.nrg_xmin[y as usize] = xmin.max(0);
            self.nrg_xmax[y as usize] = xmax.min(self.w as i32 - 1);
        }

        self.ensure_rcache();
        let rc = self.reader_channels();
        let mut win = RWindow::new(self.reader_radius, rc, self.use_cache);
        for y in 0..self.h {
            self.state.poll_cancelled()?;
            let xmin = self.nrg_xmin[y as usize];
            let xmax = self.nrg_xmax[y as usize];
            if xmin > xmax {
                continue;
            }
            for x in xmin..=xmax {
                let x = x as u32;
                win.fill(self, x, y);
                let p = self.raw[y as usize][x as usize] as usize;
                let mut e = self.energy_at(&win, x, y);
                if !self.bias.is_empty() {
                    e += self.bias.at(p) / self.w_start as f64;
                }
                self.en[p] = e as f32;
            }
        }
        log::trace!("update_emap: rows updated in [{},{}]", 0, self.h);
        Ok(())
    }
}

impl SampleSource for Carver {
    fn sample(&self, x: i32, y: i32, ch: u32) -> Option<f64> {
        if x < 0 || y < 0 || x as u32 >= self.w || y as u32 >= self.h {
            return None;
        }
        let p = self.raw[y as usize][x as usize] as usize;
        if self.use_cache && self.rcache_valid {
            let rc = self.reader_channels();
            Some(self.rcache[p * rc as usize + ch as usize])
        } else {
            Some(self.reader_scalar(p, ch))
        }
    }
}
