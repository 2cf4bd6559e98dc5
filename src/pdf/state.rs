//! Viewer state management
//!
//! Two small machines per session: `DocStatus` tracks the document
//! lifecycle (load → ready / failed) and `RenderPhase` tracks render
//! coalescing. At most one render is in flight and at most one request is
//! buffered; a newer request overwrites the buffered one, so rapid
//! navigation collapses to the latest target.

use super::backend::LoadError;

/// Margin subtracted from the viewport width before fit-to-width scaling
pub const FIT_MARGIN_PX: f32 = 20.0;

/// Document lifecycle
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DocStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(LoadError),
}

/// Render coalescing state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    Rendering { page: usize },
    RenderPending { page: usize, next: usize },
}

impl RenderPhase {
    /// Ask for `page` to be rendered. Returns `Some(page)` when the caller
    /// should start the render now; `None` means it was buffered (replacing
    /// any previously buffered page).
    #[must_use]
    pub fn request(&mut self, page: usize) -> Option<usize> {
        match *self {
            RenderPhase::Idle => {
                *self = RenderPhase::Rendering { page };
                Some(page)
            }
            RenderPhase::Rendering { page: current }
            | RenderPhase::RenderPending { page: current, .. } => {
                *self = RenderPhase::RenderPending {
                    page: current,
                    next: page,
                };
                None
            }
        }
    }

    /// The in-flight render finished. Returns the buffered page to start
    /// next, if any; the buffer is cleared either way.
    #[must_use]
    pub fn complete(&mut self) -> Option<usize> {
        match *self {
            RenderPhase::Idle => None,
            RenderPhase::Rendering { .. } => {
                *self = RenderPhase::Idle;
                None
            }
            RenderPhase::RenderPending { next, .. } => {
                *self = RenderPhase::Rendering { page: next };
                Some(next)
            }
        }
    }

    #[must_use]
    pub fn is_rendering(&self) -> bool {
        !matches!(self, RenderPhase::Idle)
    }
}

/// Per-session viewer state
#[derive(Clone, Debug)]
pub struct ViewerState {
    pub status: DocStatus,
    pub phase: RenderPhase,

    /// Current page (1-based)
    pub current_page: usize,
    pub page_count: usize,

    /// Last applied scale factor
    pub scale: f32,
    pub fit_to_width: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: DocStatus::Idle,
            phase: RenderPhase::Idle,
            current_page: 1,
            page_count: 0,
            scale: 1.5,
            fit_to_width: true,
        }
    }

    pub fn begin_loading(&mut self) {
        self.status = DocStatus::Loading;
    }

    /// Document opened; page 1 becomes current
    pub fn on_loaded(&mut self, page_count: usize) {
        self.status = DocStatus::Ready;
        self.page_count = page_count;
        self.current_page = 1;
    }

    pub fn on_load_failed(&mut self, error: LoadError) {
        self.status = DocStatus::Failed(error);
        self.phase = RenderPhase::Idle;
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == DocStatus::Ready
    }

    /// Route a page request through the coalescing path.
    /// Returns the page to start rendering now, if any.
    #[must_use]
    pub fn request_page(&mut self, page: usize) -> Option<usize> {
        if !self.is_ready() {
            return None;
        }
        self.phase.request(page)
    }

    /// Advance to the next page, clamped at the last. No-op at the boundary.
    #[must_use]
    pub fn next_page(&mut self) -> Option<usize> {
        if !self.is_ready() || self.current_page >= self.page_count {
            return None;
        }
        self.current_page += 1;
        self.request_page(self.current_page)
    }

    /// Go back one page, clamped at the first. No-op at the boundary.
    #[must_use]
    pub fn prev_page(&mut self) -> Option<usize> {
        if !self.is_ready() || self.current_page <= 1 {
            return None;
        }
        self.current_page -= 1;
        self.request_page(self.current_page)
    }

    /// A render finished; returns the buffered page to dispatch next
    #[must_use]
    pub fn on_render_complete(&mut self) -> Option<usize> {
        self.phase.complete()
    }

    /// Store the scale the worker actually applied (fit-to-width derives it
    /// per render from the page's natural width)
    pub fn record_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
    }
}

/// Fit-to-width display scale: viewport width minus a fixed margin over the
/// page's natural width at scale 1
#[must_use]
pub fn fit_width_scale(viewport_px: f32, natural_width: f32) -> f32 {
    if natural_width <= 0.0 {
        return 1.0;
    }
    let scale = (viewport_px - FIT_MARGIN_PX) / natural_width;
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}
