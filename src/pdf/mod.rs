//! PDF viewing infrastructure

mod backend;
mod convert;
mod debounce;
mod request;
mod session;
mod state;
mod worker;

pub use backend::{DocumentBackend, DocumentHandle, LoadError, PageBitmap, RenderFault};
pub use convert::{HalfblockCell, HalfblockImage, bitmap_to_halfblocks};
pub use debounce::Debouncer;
pub use request::{RenderJob, RenderOutcome, RequestId, ScaleRequest};
pub use session::{RESIZE_QUIET, RenderedPage, SessionManager, ViewerSession};
pub use state::{DocStatus, FIT_MARGIN_PX, RenderPhase, ViewerState, fit_width_scale};

#[cfg(feature = "pdf")]
pub use backend::MupdfBackend;

/// Assumed terminal cell size in pixels for fit-to-width math
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl CellSize {
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Viewport width in pixels for an area of `cols` terminal columns
    #[must_use]
    pub fn viewport_px(&self, cols: u16) -> f32 {
        f32::from(cols) * f32::from(self.width)
    }
}

impl Default for CellSize {
    fn default() -> Self {
        // Common monospace cell; only the ratio to page points matters
        Self::new(8, 16)
    }
}
