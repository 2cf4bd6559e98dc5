//! Render job and outcome types

use super::backend::{LoadError, PageBitmap, RenderFault};

/// Unique identifier for render jobs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// How the worker should derive the render scale
#[derive(Clone, Copy, Debug)]
pub enum ScaleRequest {
    /// Fit the page to the viewport width; the worker derives the factor
    /// from the page's natural width and reports it back
    FitWidth { viewport_px: f32, content_scale: f32 },

    /// Use the last explicit scale as-is
    Fixed(f32),
}

/// Job sent to the session's render worker
#[derive(Debug)]
pub enum RenderJob {
    /// Render a page (1-based)
    Page {
        id: RequestId,
        page: usize,
        scale: ScaleRequest,
    },

    /// Shut down the worker
    Shutdown,
}

/// Outcome delivered back to the session
#[derive(Debug)]
pub enum RenderOutcome {
    /// Document opened (sent once, before any page outcome)
    DocumentInfo { page_count: usize },

    /// Document could not be opened; the worker exits after this
    LoadFailed(LoadError),

    /// Rendered page bitmap plus the scale that was actually applied
    Page {
        id: RequestId,
        page: usize,
        scale: f32,
        bitmap: PageBitmap,
    },

    /// A page render failed
    PageFailed {
        id: RequestId,
        page: usize,
        fault: RenderFault,
    },
}
