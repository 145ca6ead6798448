//! Energy-map readout: the raw per-pixel energy value, and a
//! normalized `[0, 1]` rendering suitable for visualization.

use crate::carver::Carver;
use crate::error::Result;

impl Carver {
    /// The raw energy value at the currently visible `(x, y)`,
    /// recomputing the map first if it is stale.
    pub fn true_energy(&mut self, x: u32, y: u32) -> Result<f64> {
        if !self.nrg_uptodate {
            self.build_emap()?;
        }
        let p = self.raw[y as usize][x as usize] as usize;
        Ok(self.en[p] as f64)
    }

    /// The full energy map over the currently visible image, in
    /// row-major order. When `normalize` is set, values are first
    /// soft-saturated via `x / (1 + |x|)` and then rescaled to
    /// `[0, 1]` over the observed min/max; otherwise the raw energy
    /// values are returned unchanged.
    pub fn energy(&mut self, normalize: bool) -> Result<Vec<f64>> {
        if !self.nrg_uptodate {
            self.build_emap()?;
        }
        let w = self.w as usize;
        let h = self.h as usize;
        let mut out = vec![0.0f64; w * h];
        for y in 0..h {
            for x in 0..w {
                let p = self.raw[y][x] as usize;
                out[y * w + x] = self.en[p] as f64;
            }
        }
        if !normalize {
            return Ok(out);
        }
        for v in out.iter_mut() {
            *v /= 1.0 + v.abs();
        }
        let lo = out.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = out.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let span = hi - lo;
        if span > 0.0 {
            for v in out.iter_mut() {
                *v = (*v - lo) / span;
            }
        } else {
            for v in out.iter_mut() {
                *v = 0.0;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;
    use crate::types::EnergyBuiltin;

    #[test]
    fn true_energy_builds_map_lazily() {
        let buf = PixelBuffer::U8(vec![0, 255, 0, 255]);
        let mut c = Carver::new(buf, 2, 2, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.set_energy_function_builtin(EnergyBuiltin::GradXabs).unwrap();
        let e = c.true_energy(0, 0).unwrap();
        assert!(e >= 0.0);
    }

    #[test]
    fn normalized_energy_is_bounded() {
        let buf = PixelBuffer::U8(vec![0, 50, 200, 255]);
        let mut c = Carver::new(buf, 2, 2, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.set_energy_function_builtin(EnergyBuiltin::GradXabs).unwrap();
        let map = c.energy(true).unwrap();
        for v in map {
            assert!(v >= 0.0 && v <= 1.0);
        }
    }
}
