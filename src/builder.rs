//! `CarverBuilder`: a fluent entry point over [`Carver::new`] plus the
//! handful of setters almost every caller wants before the first
//! resize. Anything not covered here remains reachable through the
//! plain `Carver` setter methods after `build()`.

use crate::carver::Carver;
use crate::energy::{EnergyExtra, EnergyFn};
use crate::error::{LqrError, Result};
use crate::pixel::PixelBuffer;
use crate::types::{ColDepth, EnergyBuiltin, ImageType, ReaderType, ResizeOrder};

/// Builds a [`Carver`] by chaining the common construction-time
/// options, deferring to [`Carver::new`] and [`Carver::init`] for the
/// actual work.
pub struct CarverBuilder {
    buffer: PixelBuffer,
    width: u32,
    height: u32,
    channels: u32,
    col_depth: Option<ColDepth>,
    image_type: Option<ImageType>,
    alpha_channel: Option<u32>,
    black_channel: Option<u32>,
    delta_x: i32,
    rigidity: f32,
    energy_builtin: Option<EnergyBuiltin>,
    custom_energy: Option<(EnergyFn, u32, ReaderType, EnergyExtra)>,
    enl_step: Option<f32>,
    resize_order: Option<ResizeOrder>,
    side_switch_frequency: Option<u32>,
    use_cache: Option<bool>,
    preserve_input_image: bool,
    dump_vmaps: bool,
}

impl CarverBuilder {
    /// Start building a carver over `buffer` (`width x height x
    /// channels` samples).
    pub fn new(buffer: PixelBuffer, width: u32, height: u32, channels: u32) -> CarverBuilder {
        CarverBuilder {
            buffer,
            width,
            height,
            channels,
            col_depth: None,
            image_type: None,
            alpha_channel: None,
            black_channel: None,
            delta_x: 1,
            rigidity: 0.0,
            energy_builtin: None,
            custom_energy: None,
            enl_step: None,
            resize_order: None,
            side_switch_frequency: None,
            use_cache: None,
            preserve_input_image: false,
            dump_vmaps: false,
        }
    }

    /// Assert the buffer's sample format. Only useful as a
    /// self-documenting sanity check: `build()` fails if this does
    /// not match the format `buffer` was actually constructed with.
    pub fn col_depth(mut self, col_depth: ColDepth) -> CarverBuilder {
        self.col_depth = Some(col_depth);
        self
    }

    /// Override the inferred image type.
    pub fn image_type(mut self, image_type: ImageType) -> CarverBuilder {
        self.image_type = Some(image_type);
        self
    }

    /// Designate an alpha channel.
    pub fn alpha_channel(mut self, channel_index: u32) -> CarverBuilder {
        self.alpha_channel = Some(channel_index);
        self
    }

    /// Designate a black (K) channel.
    pub fn black_channel(mut self, channel_index: u32) -> CarverBuilder {
        self.black_channel = Some(channel_index);
        self
    }

    /// DP half-width, `0` or `1`.
    pub fn delta_x(mut self, delta_x: i32) -> CarverBuilder {
        self.delta_x = delta_x;
        self
    }

    /// Rigidity coefficient, `>= 0`.
    pub fn rigidity(mut self, rigidity: f32) -> CarverBuilder {
        self.rigidity = rigidity;
        self
    }

    /// Select a built-in energy function (mutually exclusive with
    /// [`CarverBuilder::energy_function`]; the last one set wins).
    pub fn energy_builtin(mut self, builtin: EnergyBuiltin) -> CarverBuilder {
        self.energy_builtin = Some(builtin);
        self.custom_energy = None;
        self
    }

    /// Install a caller-supplied energy function.
    pub fn energy_function(
        mut self,
        f: EnergyFn,
        radius: u32,
        reader: ReaderType,
        extra: EnergyExtra,
    ) -> CarverBuilder {
        self.custom_energy = Some((f, radius, reader, extra));
        self.energy_builtin = None;
        self
    }

    /// Per-pass enlargement factor, `(1, 2]`.
    pub fn enl_step(mut self, enl_step: f32) -> CarverBuilder {
        self.enl_step = Some(enl_step);
        self
    }

    /// Axis order `resize` tackles first.
    pub fn resize_order(mut self, order: ResizeOrder) -> CarverBuilder {
        self.resize_order = Some(order);
        self
    }

    /// Seams between tie-break side flips; `0` disables flipping.
    pub fn side_switch_frequency(mut self, frequency: u32) -> CarverBuilder {
        self.side_switch_frequency = Some(frequency);
        self
    }

    /// Enable or disable the energy-reader cache.
    pub fn use_cache(mut self, use_cache: bool) -> CarverBuilder {
        self.use_cache = Some(use_cache);
        self
    }

    /// Mark the input buffer as caller-owned.
    pub fn preserve_input_image(mut self) -> CarverBuilder {
        self.preserve_input_image = true;
        self
    }

    /// Enable visibility-map snapshotting.
    pub fn dump_vmaps(mut self) -> CarverBuilder {
        self.dump_vmaps = true;
        self
    }

    /// Construct the carver, applying every option set so far.
    pub fn build(self) -> Result<Carver> {
        if let Some(expected) = self.col_depth {
            if expected != self.buffer.col_depth() {
                return Err(LqrError::InvalidArgument(format!(
                    "col_depth {:?} does not match buffer format {:?}",
                    expected,
                    self.buffer.col_depth()
                )));
            }
        }

        let mut carver = Carver::new(self.buffer, self.width, self.height, self.channels)?;
        carver.init(self.delta_x, self.rigidity)?;

        if let Some(image_type) = self.image_type {
            carver.set_image_type(image_type)?;
        }
        if self.alpha_channel.is_some() {
            carver.set_alpha_channel(self.alpha_channel)?;
        }
        if self.black_channel.is_some() {
            carver.set_black_channel(self.black_channel)?;
        }
        if let Some(builtin) = self.energy_builtin {
            carver.set_energy_function_builtin(builtin)?;
        }
        if let Some((f, radius, reader, extra)) = self.custom_energy {
            carver.set_energy_function(f, radius, reader, extra)?;
        }
        if let Some(enl_step) = self.enl_step {
            carver.set_enl_step(enl_step)?;
        }
        if let Some(order) = self.resize_order {
            carver.set_resize_order(order);
        }
        if let Some(frequency) = self.side_switch_frequency {
            carver.set_side_switch_frequency(frequency);
        }
        if let Some(use_cache) = self.use_cache {
            carver.set_use_cache(use_cache);
        }
        if self.preserve_input_image {
            carver.set_preserve_input_image();
        }
        if self.dump_vmaps {
            carver.set_dump_vmaps(true);
        }

        Ok(carver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let buf = PixelBuffer::U8(vec![0; 16]);
        let carver = CarverBuilder::new(buf, 4, 4, 1).build().unwrap();
        assert_eq!(carver.width(), 4);
        assert_eq!(carver.height(), 4);
    }

    #[test]
    fn rejects_mismatched_col_depth() {
        let buf = PixelBuffer::U8(vec![0; 16]);
        let result = CarverBuilder::new(buf, 4, 4, 1).col_depth(ColDepth::F32).build();
        assert!(result.is_err());
    }

    #[test]
    fn chains_common_options() {
        let buf = PixelBuffer::U8(vec![0; 16]);
        let carver = CarverBuilder::new(buf, 4, 4, 1)
            .col_depth(ColDepth::U8)
            .delta_x(1)
            .rigidity(0.0)
            .energy_builtin(EnergyBuiltin::GradXabs)
            .resize_order(ResizeOrder::HeightFirst)
            .build()
            .unwrap();
        assert_eq!(carver.width(), 4);
    }
}
