//! The public resize driver: `resize(w1, h1)`, which walks width and
//! height (in the configured order) down to `build_maps` calls of
//! bounded depth, flattening and re-transposing as needed so a single
//! `build_maps`/`inflate` pair handles both shrinking and growing.
//!
//! Grounded on `lqr_carver_resize_width`/`_height`/`_resize` in
//! `original_source/src/lqr_carver.c`: the two axis-specific drivers
//! are near-identical once the image has been forced into the right
//! orientation, so they collapse here into one `resize_dimension`
//! parameterized by `force_transposed`.

use crate::carver::Carver;
use crate::dump::VsMapSnapshot;
use crate::error::{LqrError, Result};
use crate::state::CarverState;
use crate::types::ResizeOrder;

impl Carver {
    fn delta_max_for(enl_step: f32, start: u32) -> i32 {
        let raw = ((enl_step - 1.0) * start as f32) as i32 - 1;
        raw.max(1)
    }

    /// Drive one axis (width if `force_transposed` is `false`, height
    /// otherwise) toward `target`, re-entrant across however many
    /// `build_maps` passes `enl_step` requires.
    fn resize_dimension(&mut self, target: u32, force_transposed: bool) -> Result<()> {
        let (start, current) = if !force_transposed {
            (self.ref_width(), self.width())
        } else {
            (self.ref_height(), self.height())
        };
        let mut delta = target as i32 - start as i32;
        let mut gamma = target as i32 - current as i32;
        let mut delta_max = Self::delta_max_for(self.enl_step, start);
        if delta < 0 {
            delta = -delta;
            delta_max = delta;
        }

        if gamma == 0 {
            return Ok(());
        }

        // Held across the whole loop so `poll_cancelled` inside
        // `build_maps`'s seam-carving loop can observe a cancel that
        // arrives mid-resize. `transpose`/`flatten`/`build_maps` take
        // their own guard too, but `SharedState::enter` is reentrant
        // within a thread, so those nested calls reuse this one
        // instead of deadlocking on the ticket lock.
        let _guard = self.state.enter(CarverState::Resizing);
        while gamma != 0 {
            self.state.poll_cancelled()?;
            let delta0 = delta.min(delta_max);
            delta -= delta0;

            if self.transposed != force_transposed {
                self.transpose()?;
            }

            let new_w = (target as i32).min(self.w_start as i32 + delta_max) as u32;
            gamma = target as i32 - new_w as i32;
            self.build_maps((delta0 + 1) as u32)?;
            self.set_width(new_w)?;
            for aux in &mut self.attached {
                aux.set_width(new_w)?;
            }

            if self.dump_vmaps {
                let snap = VsMapSnapshot::new(self.w0, self.h0, self.vs.borrow().clone());
                self.flushed_vs.push(snap);
            }

            if new_w < target {
                self.flatten()?;
                delta_max = Self::delta_max_for(self.enl_step, self.w_start);
            }
        }

        Ok(())
    }

    /// Resize the visible image to `(w1, h1)`, in the axis order set
    /// by [`Carver::set_resize_order`]. Must be called on the root
    /// carver while idle; propagates the same geometry to every
    /// attached carver.
    pub fn resize(&mut self, w1: u32, h1: u32) -> Result<()> {
        if w1 == 0 || h1 == 0 {
            return Err(LqrError::InvalidArgument("target width and height must be nonzero".into()));
        }
        if !self.is_root {
            return Err(LqrError::InvalidState("resize must be called on the root carver".into()));
        }
        if self.state.get() != CarverState::Std {
            return Err(LqrError::InvalidState("carver is not idle".into()));
        }
        self.state.poll_cancelled()?;

        log::info!("resize: {}x{} -> {}x{}", self.width(), self.height(), w1, h1);
        match self.resize_order {
            ResizeOrder::WidthFirst => {
                self.resize_dimension(w1, false)?;
                self.resize_dimension(h1, true)?;
            }
            ResizeOrder::HeightFirst => {
                self.resize_dimension(h1, true)?;
                self.resize_dimension(w1, false)?;
            }
        }
        self.reset_cursor();
        log::info!("resize: done, now {}x{}", self.width(), self.height());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;
    use crate::types::EnergyBuiltin;

    fn gradient_carver(w: u32, h: u32) -> Carver {
        let mut data = vec![0u8; (w * h) as usize];
        for y in 0..h {
            for x in 0..w {
                data[(y * w + x) as usize] = ((x * 255) / w.max(1)) as u8;
            }
        }
        let buf = PixelBuffer::U8(data);
        let mut c = Carver::new(buf, w, h, 1).unwrap();
        c.init(1, 0.0).unwrap();
        c.set_energy_function_builtin(EnergyBuiltin::GradXabs).unwrap();
        c
    }

    #[test]
    fn resize_shrinks_width_only() {
        let mut c = gradient_carver(10, 6);
        c.resize(7, 6).unwrap();
        assert_eq!(c.width(), 7);
        assert_eq!(c.height(), 6);
    }

    #[test]
    fn resize_shrinks_both_axes() {
        let mut c = gradient_carver(10, 8);
        c.resize(7, 5).unwrap();
        assert_eq!(c.width(), 7);
        assert_eq!(c.height(), 5);
    }

    #[test]
    fn resize_enlarges_width() {
        let mut c = gradient_carver(8, 6);
        c.resize(11, 6).unwrap();
        assert_eq!(c.width(), 11);
        assert_eq!(c.height(), 6);
    }

    #[test]
    fn resize_is_noop_at_same_size() {
        let mut c = gradient_carver(6, 6);
        c.resize(6, 6).unwrap();
        assert_eq!(c.width(), 6);
        assert_eq!(c.height(), 6);
    }

    #[test]
    fn resize_rejects_zero_target() {
        let mut c = gradient_carver(4, 4);
        assert!(c.resize(0, 4).is_err());
    }

    #[test]
    fn resize_height_first_order_matches_width_first_result_size() {
        let mut a = gradient_carver(10, 8);
        a.resize(7, 5).unwrap();
        let mut b = gradient_carver(10, 8);
        b.set_resize_order(ResizeOrder::HeightFirst);
        b.resize(7, 5).unwrap();
        assert_eq!(a.width(), b.width());
        assert_eq!(a.height(), b.height());
    }
}
