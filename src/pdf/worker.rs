//! Render worker - one thread per viewer session
//!
//! The worker opens the document, reports its metadata, then serves page
//! jobs sequentially. One worker per session means renders for a session
//! are naturally serialized; coalescing happens on the session side.

use std::path::Path;

use flume::{Receiver, Sender};
use log::{debug, warn};

use super::backend::{DocumentBackend, DocumentHandle, LoadError};
use super::request::{RenderJob, RenderOutcome, ScaleRequest};
use super::state::fit_width_scale;

pub fn render_worker<B: DocumentBackend>(
    backend: &B,
    doc_path: &Path,
    jobs: &Receiver<RenderJob>,
    outcomes: &Sender<RenderOutcome>,
) {
    let handle = match backend.open(doc_path) {
        Ok(handle) => handle,
        Err(e) => {
            warn!("Failed to open {doc_path:?}: {e}");
            let _ = outcomes.send(RenderOutcome::LoadFailed(e));
            return;
        }
    };

    if handle.page_count() == 0 {
        let _ = outcomes.send(RenderOutcome::LoadFailed(LoadError::Malformed {
            detail: "document has no pages".to_string(),
        }));
        return;
    }

    let _ = outcomes.send(RenderOutcome::DocumentInfo {
        page_count: handle.page_count(),
    });
    debug!("Opened {doc_path:?} ({} pages)", handle.page_count());

    for job in jobs.iter() {
        match job {
            RenderJob::Page { id, page, scale } => {
                let scale = match resolve_scale(&handle, page, scale) {
                    Ok(scale) => scale,
                    Err(fault) => {
                        let _ = outcomes.send(RenderOutcome::PageFailed { id, page, fault });
                        continue;
                    }
                };

                match handle.render_page(page, scale) {
                    Ok(bitmap) => {
                        let _ = outcomes.send(RenderOutcome::Page {
                            id,
                            page,
                            scale,
                            bitmap,
                        });
                    }
                    Err(fault) => {
                        let _ = outcomes.send(RenderOutcome::PageFailed { id, page, fault });
                    }
                }
            }

            RenderJob::Shutdown => break,
        }
    }
}

fn resolve_scale<H: DocumentHandle>(
    handle: &H,
    page: usize,
    request: ScaleRequest,
) -> Result<f32, super::backend::RenderFault> {
    match request {
        ScaleRequest::Fixed(scale) => Ok(scale),
        ScaleRequest::FitWidth {
            viewport_px,
            content_scale,
        } => {
            let (natural_width, _) = handle.natural_size(page)?;
            Ok(fit_width_scale(viewport_px, natural_width) * content_scale)
        }
    }
}
