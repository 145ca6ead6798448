//! Progress reporting hook.
//!
//! The carver calls this at coarse granularity (once per seam level,
//! not once per pixel) so implementations can drive a progress bar
//! without being swamped.

/// Receives progress updates from a long-running resize.
pub trait Progress {
    /// Called once, before the first seam of a resize is computed,
    /// with the total number of seams the driver expects to process.
    fn init(&mut self, _total_steps: u32) {}

    /// Called after each seam has been removed or inserted.
    fn update(&mut self, _step: u32, _total_steps: u32) {}

    /// Called once the resize completes, successfully or not.
    fn end(&mut self) {}
}

/// A [`Progress`] implementation that does nothing; the default for
/// carvers that don't need progress reporting.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl Progress for NullProgress {}
