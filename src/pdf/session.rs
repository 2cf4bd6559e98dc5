//! Viewer sessions - one per lesson document
//!
//! A session owns a worker thread for its document and drives the
//! coalescing state machine: requests made while a render is in flight
//! overwrite the single pending slot, and the pending page is dispatched
//! the moment the in-flight render completes. Sessions are independent;
//! the `SessionManager` hands them out keyed by lesson index.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use flume::{Receiver, Sender};
use log::{debug, warn};

use super::backend::{DocumentBackend, PageBitmap};
use super::debounce::Debouncer;
use super::request::{RenderJob, RenderOutcome, RequestId, ScaleRequest};
use super::state::ViewerState;
use super::worker::render_worker;

/// Quiet period before a resize triggers a re-render
pub const RESIZE_QUIET: Duration = Duration::from_millis(200);

/// Latest rendered page held for display
pub struct RenderedPage {
    pub page: usize,
    pub bitmap: PageBitmap,
}

pub struct ViewerSession {
    state: ViewerState,
    job_tx: Sender<RenderJob>,
    outcome_rx: Receiver<RenderOutcome>,
    next_request_id: u64,
    current_render: Option<RenderedPage>,
    resize: Debouncer,
    viewport_px: f32,
    content_scale: f32,
}

impl ViewerSession {
    /// Spawn a session and its worker for the document at `doc_path`.
    /// The path must already be resolved to an absolute reference.
    #[must_use]
    pub fn spawn<B: DocumentBackend>(backend: B, doc_path: PathBuf) -> Self {
        let (job_tx, job_rx) = flume::unbounded();
        let (outcome_tx, outcome_rx) = flume::unbounded();

        std::thread::spawn(move || {
            render_worker(&backend, &doc_path, &job_rx, &outcome_tx);
        });

        let mut state = ViewerState::new();
        state.begin_loading();

        Self {
            state,
            job_tx,
            outcome_rx,
            next_request_id: 1,
            current_render: None,
            resize: Debouncer::new(RESIZE_QUIET),
            viewport_px: 0.0,
            content_scale: 1.0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    #[must_use]
    pub fn current_render(&self) -> Option<&RenderedPage> {
        self.current_render.as_ref()
    }

    /// Drain worker outcomes; returns true when the display changed
    pub fn poll(&mut self) -> bool {
        let outcomes: Vec<RenderOutcome> = self.outcome_rx.try_iter().collect();
        let mut changed = false;

        for outcome in outcomes {
            changed = true;
            match outcome {
                RenderOutcome::DocumentInfo { page_count } => {
                    self.state.on_loaded(page_count);
                    debug!("Document ready: {page_count} pages");
                    if let Some(page) = self.state.request_page(1) {
                        self.dispatch(page);
                    }
                }

                RenderOutcome::LoadFailed(error) => {
                    warn!("Document load failed: {error}");
                    self.state.on_load_failed(error);
                }

                RenderOutcome::Page {
                    page, scale, bitmap, ..
                } => {
                    self.state.record_scale(scale);
                    self.current_render = Some(RenderedPage { page, bitmap });
                    if let Some(next) = self.state.on_render_complete() {
                        self.dispatch(next);
                    }
                }

                RenderOutcome::PageFailed { page, fault, .. } => {
                    warn!("Render of page {page} failed: {fault}");
                    if let Some(next) = self.state.on_render_complete() {
                        self.dispatch(next);
                    }
                }
            }
        }

        changed
    }

    /// Request a page through the coalescing path
    pub fn request_page(&mut self, page: usize) {
        if let Some(page) = self.state.request_page(page) {
            self.dispatch(page);
        }
    }

    pub fn next_page(&mut self) {
        if let Some(page) = self.state.next_page() {
            self.dispatch(page);
        }
    }

    pub fn prev_page(&mut self) {
        if let Some(page) = self.state.prev_page() {
            self.dispatch(page);
        }
    }

    /// Viewport width changed (in pixels); arms the resize debounce.
    /// The first layout records the viewport without debouncing.
    pub fn on_resize(&mut self, viewport_px: f32) {
        if self.viewport_px == 0.0 {
            self.viewport_px = viewport_px;
        } else if (viewport_px - self.viewport_px).abs() > f32::EPSILON {
            self.viewport_px = viewport_px;
            self.resize.poke();
        }
    }

    /// Record the viewport without debouncing (first layout)
    pub fn set_viewport(&mut self, viewport_px: f32) {
        self.viewport_px = viewport_px;
    }

    /// Content scale from the font-size preference; re-render to apply
    pub fn set_content_scale(&mut self, content_scale: f32) {
        self.content_scale = content_scale;
    }

    /// Fire due debounced work; returns true if a re-render was started
    pub fn tick(&mut self) -> bool {
        if self.resize.fire_due() && self.state.is_ready() {
            let current = self.state.current_page;
            self.request_page(current);
            return true;
        }
        false
    }

    /// Re-render the current page immediately (scale or theme change)
    pub fn refresh(&mut self) {
        if self.state.is_ready() {
            let current = self.state.current_page;
            self.request_page(current);
        }
    }

    fn dispatch(&mut self, page: usize) {
        let scale = if self.state.fit_to_width {
            ScaleRequest::FitWidth {
                viewport_px: self.viewport_px,
                content_scale: self.content_scale,
            }
        } else {
            ScaleRequest::Fixed(self.state.scale)
        };

        let id = self.next_id();
        let _ = self.job_tx.send(RenderJob::Page { id, page, scale });
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        let _ = self.job_tx.send(RenderJob::Shutdown);
    }
}

/// Owns all viewer sessions, keyed by lesson index.
/// Replaces any page-wide instance registry: whoever constructs widgets
/// gets this passed in.
#[derive(Default)]
pub struct SessionManager {
    sessions: HashMap<usize, ViewerSession>,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Get or create the session for a lesson index. `create` runs at most
    /// once per index.
    pub fn ensure(
        &mut self,
        index: usize,
        create: impl FnOnce() -> ViewerSession,
    ) -> &mut ViewerSession {
        self.sessions.entry(index).or_insert_with(create)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ViewerSession> {
        self.sessions.get(&index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ViewerSession> {
        self.sessions.get_mut(&index)
    }

    /// Drain outcomes on every session; true if any display changed
    pub fn poll_all(&mut self) -> bool {
        let mut changed = false;
        for session in self.sessions.values_mut() {
            changed |= session.poll();
        }
        changed
    }

    /// Fire due debounced re-renders on every session
    pub fn tick_all(&mut self) -> bool {
        let mut fired = false;
        for session in self.sessions.values_mut() {
            fired |= session.tick();
        }
        fired
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::backend::{DocumentBackend, DocumentHandle, LoadError, RenderFault};
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Instant;

    struct FakeBackend {
        pages: usize,
        render_delay: Duration,
        render_count: Arc<AtomicUsize>,
        fail_open: Option<LoadError>,
    }

    struct FakeHandle {
        pages: usize,
        render_delay: Duration,
        render_count: Arc<AtomicUsize>,
    }

    impl DocumentBackend for FakeBackend {
        type Handle = FakeHandle;

        fn open(&self, _path: &Path) -> Result<FakeHandle, LoadError> {
            if let Some(error) = &self.fail_open {
                return Err(error.clone());
            }
            Ok(FakeHandle {
                pages: self.pages,
                render_delay: self.render_delay,
                render_count: self.render_count.clone(),
            })
        }
    }

    impl DocumentHandle for FakeHandle {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn natural_size(&self, _page: usize) -> Result<(f32, f32), RenderFault> {
            Ok((600.0, 800.0))
        }

        fn render_page(&self, _page: usize, _scale: f32) -> Result<PageBitmap, RenderFault> {
            thread::sleep(self.render_delay);
            self.render_count.fetch_add(1, Ordering::SeqCst);
            Ok(PageBitmap {
                pixels: vec![0; 12],
                width_px: 2,
                height_px: 2,
            })
        }
    }

    fn poll_until(session: &mut ViewerSession, deadline: Duration, done: impl Fn(&ViewerSession) -> bool) {
        let start = Instant::now();
        while start.elapsed() < deadline {
            session.poll();
            if done(session) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn ready_session(pages: usize, delay: Duration, count: Arc<AtomicUsize>) -> ViewerSession {
        let backend = FakeBackend {
            pages,
            render_delay: delay,
            render_count: count,
            fail_open: None,
        };
        let mut session = ViewerSession::spawn(backend, PathBuf::from("fake.pdf"));
        session.set_viewport(620.0);
        session.set_content_scale(1.0);

        // Wait for load + initial page-1 render
        poll_until(&mut session, Duration::from_secs(2), |s| {
            s.current_render().is_some() && !s.state().phase.is_rendering()
        });
        session
    }

    #[test]
    fn rapid_requests_produce_exactly_one_followup_render() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut session = ready_session(10, Duration::from_millis(80), count.clone());
        assert_eq!(count.load(Ordering::SeqCst), 1); // initial page 1

        // First request goes straight to the worker...
        session.request_page(2);
        // ...the rest land while it is in flight and coalesce
        session.request_page(3);
        session.request_page(4);
        session.request_page(7);

        poll_until(&mut session, Duration::from_secs(2), |s| {
            !s.state().phase.is_rendering()
        });

        // page 2 rendered, then exactly one follow-up: page 7
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(session.current_render().unwrap().page, 7);
    }

    #[test]
    fn navigation_is_clamped_end_to_end() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut session = ready_session(2, Duration::from_millis(5), count);

        session.next_page();
        poll_until(&mut session, Duration::from_secs(1), |s| {
            !s.state().phase.is_rendering()
        });
        assert_eq!(session.state().current_page, 2);

        // Clamped at the end; no job dispatched
        session.next_page();
        assert!(!session.state().phase.is_rendering());
        assert_eq!(session.state().current_page, 2);
    }

    #[test]
    fn failed_open_surfaces_load_error() {
        let backend = FakeBackend {
            pages: 0,
            render_delay: Duration::ZERO,
            render_count: Arc::new(AtomicUsize::new(0)),
            fail_open: Some(LoadError::NotFound {
                path: "missing.pdf".into(),
            }),
        };
        let mut session = ViewerSession::spawn(backend, PathBuf::from("missing.pdf"));

        poll_until(&mut session, Duration::from_secs(2), |s| {
            matches!(s.state().status, crate::pdf::DocStatus::Failed(_))
        });

        match &session.state().status {
            crate::pdf::DocStatus::Failed(LoadError::NotFound { path }) => {
                assert_eq!(path, "missing.pdf");
            }
            other => panic!("expected NotFound failure, got {other:?}"),
        }
    }

    #[test]
    fn debounced_resize_rerenders_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut session = ready_session(5, Duration::from_millis(5), count.clone());
        let before = count.load(Ordering::SeqCst);

        // A burst of resizes within the quiet window
        session.on_resize(500.0);
        session.on_resize(480.0);
        session.on_resize(450.0);
        assert!(!session.tick());

        thread::sleep(RESIZE_QUIET + Duration::from_millis(50));
        assert!(session.tick());

        poll_until(&mut session, Duration::from_secs(1), |s| {
            !s.state().phase.is_rendering()
        });
        assert_eq!(count.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn sessions_are_independent() {
        let count_a = Arc::new(AtomicUsize::new(0));
        let count_b = Arc::new(AtomicUsize::new(0));
        let mut manager = SessionManager::new();

        manager.ensure(0, || {
            ready_session(4, Duration::from_millis(5), count_a.clone())
        });
        manager.ensure(1, || {
            ready_session(4, Duration::from_millis(5), count_b.clone())
        });

        // Creating index 0 again must not replace the session
        let before = manager.len();
        manager.ensure(0, || unreachable!("session already exists"));
        assert_eq!(manager.len(), before);

        manager.get_mut(0).unwrap().next_page();
        for _ in 0..50 {
            manager.poll_all();
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(manager.get(0).unwrap().state().current_page, 2);
        assert_eq!(manager.get(1).unwrap().state().current_page, 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
    }
}
