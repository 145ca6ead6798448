//! The central `Carver`: dimensions, buffers, and the public API
//! surface. The algorithms themselves (energy, DP, seam tracing,
//! inflate, flatten/transpose, resize) live in their own modules as
//! further `impl Carver` blocks, matching the way the rest of this
//! crate splits one concept per file.

use std::rc::Rc;
use std::cell::RefCell;
use std::sync::Arc;

use crate::bias::BiasMap;
use crate::cursor::Cursor;
use crate::dump::VsMapSnapshot;
use crate::energy::{EnergyExtra, EnergyFn};
use crate::error::{try_vec_filled, LqrError, Result};
use crate::pixel::PixelBuffer;
use crate::progress::{NullProgress, Progress};
use crate::rigidity::{RigidityMap, RigidityMask};
use crate::state::{CarverHandle, SharedState};
use crate::types::{ColDepth, EnergyBuiltin, ImageType, ReaderType, ResizeOrder};

/// The shared, root-owned visibility map. `0` means "still visible";
/// any positive value is the level at which the pixel disappeared (or,
/// after an inflate, the shifted insertion level). See
/// `SPEC_FULL.md` §4.12 for the exact shift arithmetic.
pub type VisMap = Rc<RefCell<Vec<i32>>>;

/// The content-aware resizing engine. See the crate's module docs for
/// the algorithms; this struct only holds state.
pub struct Carver {
    pub(crate) w_start: u32,
    pub(crate) h_start: u32,
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) w0: u32,
    pub(crate) h0: u32,
    pub(crate) level: u32,
    pub(crate) max_level: u32,

    pub(crate) channels: u32,
    pub(crate) alpha_channel: Option<u32>,
    pub(crate) black_channel: Option<u32>,
    pub(crate) image_type: ImageType,
    pub(crate) col_depth: ColDepth,
    pub(crate) rgb: PixelBuffer,
    pub(crate) preserve_input_image: bool,

    pub(crate) vs: VisMap,
    pub(crate) is_root: bool,

    pub(crate) en: Vec<f32>,
    pub(crate) m: Vec<f32>,
    pub(crate) least: Vec<u32>,
    pub(crate) raw: Vec<Vec<u32>>,

    pub(crate) vpath: Vec<u32>,
    pub(crate) vpath_x: Vec<u32>,
    pub(crate) nrg_xmin: Vec<i32>,
    pub(crate) nrg_xmax: Vec<i32>,
    pub(crate) nrg_uptodate: bool,

    pub(crate) delta_x: i32,
    pub(crate) rigidity: f32,
    pub(crate) rigidity_map: RigidityMap,
    pub(crate) rigidity_mask: RigidityMask,

    pub(crate) bias: BiasMap,

    pub(crate) energy_builtin: EnergyBuiltin,
    pub(crate) energy_fn: Option<EnergyFn>,
    pub(crate) energy_extra: EnergyExtra,
    pub(crate) reader_type: ReaderType,
    pub(crate) reader_radius: i32,
    pub(crate) use_cache: bool,
    pub(crate) rcache: Vec<f64>,
    pub(crate) rcache_valid: bool,

    pub(crate) enl_step: f32,
    pub(crate) resize_order: ResizeOrder,
    pub(crate) lr_switch_frequency: u32,
    pub(crate) leftright: bool,

    pub(crate) dump_vmaps: bool,
    pub(crate) flushed_vs: Vec<VsMapSnapshot>,

    pub(crate) transposed: bool,
    pub(crate) attached: Vec<Carver>,

    pub(crate) state: SharedState,
    pub(crate) progress: Box<dyn Progress>,
    pub(crate) cursor: Cursor,
}

impl Carver {
    /// Adopt a pixel buffer of `width x height x channels` samples.
    /// `image_type` defaults from the channel count (1=GREY, 2=GREYA,
    /// 3=RGB, 4=RGBA, 5=CMYKA, else CUSTOM) and can be overridden with
    /// [`Carver::set_image_type`].
    pub fn new(buffer: PixelBuffer, width: u32, height: u32, channels: u32) -> Result<Carver> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(LqrError::InvalidArgument("width, height and channels must be nonzero".into()));
        }
        let expected = width as usize * height as usize * channels as usize;
        if buffer.len() != expected {
            return Err(LqrError::InvalidArgument(format!(
                "buffer has {} samples, expected {}",
                buffer.len(),
                expected
            )));
        }
        let col_depth = buffer.col_depth();
        let image_type = ImageType::from_channel_count(channels);
        let vs = Rc::new(RefCell::new(try_vec_filled(0i32, (width * height) as usize)?));
        Ok(Carver {
            w_start: width,
            h_start: height,
            w: width,
            h: height,
            w0: width,
            h0: height,
            level: 1,
            max_level: 1,
            channels,
            alpha_channel: None,
            black_channel: None,
            image_type,
            col_depth,
            rgb: buffer,
            preserve_input_image: false,
            vs,
            is_root: true,
            en: Vec::new(),
            m: Vec::new(),
            least: Vec::new(),
            raw: (0..height).map(|y| (0..width).map(|x| y * width + x).collect()).collect(),
            vpath: vec![0; height as usize],
            vpath_x: vec![0; height as usize],
            nrg_xmin: vec![0; height as usize],
            nrg_xmax: vec![-1; height as usize],
            nrg_uptodate: false,
            delta_x: 1,
            rigidity: 0.0,
            rigidity_map: RigidityMap::build(0.0, 1, height),
            rigidity_mask: RigidityMask::default(),
            bias: BiasMap::default(),
            energy_builtin: EnergyBuiltin::GradNorm,
            energy_fn: None,
            energy_extra: Arc::new(()),
            reader_type: ReaderType::Brightness,
            reader_radius: 1,
            use_cache: true,
            rcache: Vec::new(),
            rcache_valid: false,
            enl_step: 2.0,
            resize_order: ResizeOrder::WidthFirst,
            lr_switch_frequency: 0,
            leftright: false,
            dump_vmaps: false,
            flushed_vs: Vec::new(),
            transposed: false,
            attached: Vec::new(),
            state: SharedState::default(),
            progress: Box::new(NullProgress),
            cursor: Cursor::new(width, height),
        })
    }

    /// Allocate the derived maps (`en`, `m`, `least`, rigidity kernel)
    /// and set the DP half-width / rigidity coefficient. Must be
    /// called once before the first resize.
    pub fn init(&mut self, delta_x: i32, rigidity: f32) -> Result<()> {
        if !(0..=1).contains(&delta_x) {
            return Err(LqrError::InvalidArgument("delta_x must be 0 or 1".into()));
        }
        if rigidity < 0.0 {
            return Err(LqrError::InvalidArgument("rigidity must be >= 0".into()));
        }
        self.delta_x = delta_x;
        self.rigidity = rigidity;
        self.rigidity_map = RigidityMap::build(rigidity, delta_x, self.h0);
        self.reader_radius = delta_x.max(1);
        let size = (self.w0 * self.h0) as usize;
        self.en = try_vec_filled(0.0f32, size)?;
        self.m = try_vec_filled(0.0f32, size)?;
        self.least = try_vec_filled(u32::MAX, size)?;
        Ok(())
    }

    /// Override the inferred image type.
    pub fn set_image_type(&mut self, image_type: ImageType) -> Result<()> {
        self.image_type = image_type;
        self.rcache_valid = false;
        Ok(())
    }

    /// Designate a channel as alpha (weights brightness/luma readers).
    pub fn set_alpha_channel(&mut self, channel_index: Option<u32>) -> Result<()> {
        if let Some(ch) = channel_index {
            if ch >= self.channels {
                return Err(LqrError::InvalidArgument("alpha channel out of range".into()));
            }
        }
        self.alpha_channel = channel_index;
        self.rcache_valid = false;
        Ok(())
    }

    /// Designate a channel as black (used by CMYK compositing).
    pub fn set_black_channel(&mut self, channel_index: Option<u32>) -> Result<()> {
        if let Some(ch) = channel_index {
            if ch >= self.channels {
                return Err(LqrError::InvalidArgument("black channel out of range".into()));
            }
        }
        self.black_channel = channel_index;
        self.rcache_valid = false;
        Ok(())
    }

    /// Set the maximum per-pass enlargement factor; must be in `(1, 2]`.
    pub fn set_enl_step(&mut self, enl_step: f32) -> Result<()> {
        if !(enl_step > 1.0 && enl_step <= 2.0) {
            return Err(LqrError::InvalidArgument("enl_step must be in (1, 2]".into()));
        }
        self.enl_step = enl_step;
        Ok(())
    }

    /// Choose whether `resize` tackles width or height first.
    pub fn set_resize_order(&mut self, order: ResizeOrder) {
        self.resize_order = order;
    }

    /// How many seams to process between `leftright` tie-break flips;
    /// `0` disables flipping.
    pub fn set_side_switch_frequency(&mut self, frequency: u32) {
        self.lr_switch_frequency = frequency;
    }

    /// Mark the input buffer as caller-owned: the carver will not
    /// attempt to reuse it in place past its initial contents.
    pub fn set_preserve_input_image(&mut self) {
        self.preserve_input_image = true;
    }

    /// Enable or disable the energy-reader cache.
    pub fn set_use_cache(&mut self, use_cache: bool) {
        self.use_cache = use_cache;
        self.rcache_valid = false;
    }

    /// Enable snapshotting the visibility map after every seam for
    /// later inspection via [`Carver::flushed_vmaps`].
    pub fn set_dump_vmaps(&mut self, dump: bool) {
        self.dump_vmaps = dump;
    }

    /// Install a progress sink.
    pub fn set_progress(&mut self, progress: Box<dyn Progress>) {
        self.progress = progress;
    }

    /// Select a built-in energy function.
    pub fn set_energy_function_builtin(&mut self, builtin: EnergyBuiltin) -> Result<()> {
        self.energy_builtin = builtin;
        self.energy_fn = None;
        self.rcache_valid = false;
        Ok(())
    }

    /// Install a caller-supplied energy function.
    pub fn set_energy_function(
        &mut self,
        f: EnergyFn,
        radius: u32,
        reader: ReaderType,
        extra: EnergyExtra,
    ) -> Result<()> {
        if radius == 0 {
            return Err(LqrError::InvalidArgument("radius must be >= 1".into()));
        }
        self.reader_radius = radius as i32;
        self.reader_type = reader;
        self.energy_fn = Some(f);
        self.energy_extra = extra;
        self.rcache_valid = false;
        Ok(())
    }

    /// Attach `aux` to `root` as a slave carver: `aux` will shadow
    /// every geometric operation `root` performs and shares `root`'s
    /// visibility map. Both carvers must be in the idle state and
    /// share `(w0, h0)`.
    pub fn attach(root: &mut Carver, mut aux: Carver) -> Result<()> {
        if root.w0 != aux.w0 || root.h0 != aux.h0 {
            return Err(LqrError::InvalidArgument("attached carvers must share the root's physical size".into()));
        }
        if root.state.get() != crate::state::CarverState::Std || aux.state.get() != crate::state::CarverState::Std {
            return Err(LqrError::InvalidState("both carvers must be idle to attach".into()));
        }
        aux.vs = root.vs.clone();
        aux.is_root = false;
        root.attached.push(aux);
        Ok(())
    }

    /// A handle that can cancel this carver's running operation from
    /// another thread.
    pub fn handle(&self) -> CarverHandle {
        self.state.handle()
    }

    /// Request cancellation of the currently running operation, if
    /// any. Safe to call from any thread; idempotent.
    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// Current visible width (public orientation, i.e. post-transpose).
    pub fn width(&self) -> u32 {
        if self.transposed { self.h } else { self.w }
    }

    /// Current visible height (public orientation).
    pub fn height(&self) -> u32 {
        if self.transposed { self.w } else { self.h }
    }

    /// The width the carver was originally constructed with.
    pub fn ref_width(&self) -> u32 {
        if self.transposed { self.h_start } else { self.w_start }
    }

    /// The height the carver was originally constructed with.
    pub fn ref_height(&self) -> u32 {
        if self.transposed { self.w_start } else { self.h_start }
    }

    /// Channel count.
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Sample format.
    pub fn col_depth(&self) -> ColDepth {
        self.col_depth
    }

    /// Current image type.
    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    /// Current enlargement step.
    pub fn enl_step(&self) -> f32 {
        self.enl_step
    }

    /// Whether the internal axes are currently swapped relative to
    /// the public orientation.
    pub fn orientation(&self) -> bool {
        self.transposed
    }

    /// Current visibility level (`1` means full visibility).
    pub fn depth(&self) -> u32 {
        self.level
    }

    /// Snapshots of the visibility map taken after each seam, if
    /// [`Carver::set_dump_vmaps`] was enabled.
    pub fn flushed_vmaps(&self) -> &[VsMapSnapshot] {
        &self.flushed_vs
    }

    pub(crate) fn physical_len(&self) -> usize {
        (self.w0 * self.h0) as usize
    }
}
