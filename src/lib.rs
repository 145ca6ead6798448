#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Content-aware (seam carving / liquid rescale) image resizing.
//!
//! A [`Carver`] adopts a pixel buffer, builds an energy map from its
//! content, and removes or inserts low-energy vertical seams to change
//! its width (transposing internally to do the same for height). A
//! visibility map records every seam ever found, so a carver can be
//! resized back toward its original size without recomputing work
//! already done, and enlarged past its original size by inserting
//! pixels along the seams it would otherwise have removed.
//!
//! ```no_run
//! use lqr_rs::{CarverBuilder, ColDepth, EnergyBuiltin, PixelBuffer};
//!
//! let buffer = PixelBuffer::U8(vec![0u8; 4 * 3]);
//! let mut carver = CarverBuilder::new(buffer, 4, 3, 1)
//!     .col_depth(ColDepth::U8)
//!     .delta_x(1)
//!     .rigidity(0.0)
//!     .energy_builtin(EnergyBuiltin::GradXabs)
//!     .build()?;
//! carver.resize(3, 3)?;
//! # Ok::<(), lqr_rs::LqrError>(())
//! ```

mod bias;
mod builder;
mod carver;
mod cursor;
mod dump;
mod emap;
mod energy;
mod error;
mod inflate;
mod mmap;
mod pixel;
mod progress;
mod readout;
mod resize;
mod rigidity;
mod rwindow;
mod scan;
mod seam;
mod state;
mod transform;
mod types;
mod vsmap;

pub use builder::CarverBuilder;
pub use carver::Carver;
pub use dump::VsMapSnapshot;
pub use energy::{EnergyExtra, EnergyFn};
pub use error::{LqrError, Result};
pub use pixel::{get_rgbcol, PixelBuffer};
pub use progress::{NullProgress, Progress};
pub use rigidity::{RigidityMap, RigidityMask};
pub use rwindow::MaterializedWindow;
pub use state::CarverHandle;
pub use types::{ColDepth, EnergyBuiltin, ImageType, ReaderType, ResizeOrder};
