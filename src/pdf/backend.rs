//! Document backend abstraction
//!
//! The rasterizer is an external collaborator. Sessions talk to it through
//! these traits so the render machinery can be exercised without a real
//! PDF engine; the MuPDF implementation lives behind the `pdf` feature.

use std::path::Path;

/// Raw rendered page image, RGB, 3 bytes per pixel
#[derive(Clone)]
pub struct PageBitmap {
    pub pixels: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

impl std::fmt::Debug for PageBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBitmap")
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("pixels", &format!("{} bytes", self.pixels.len()))
            .finish()
    }
}

/// Why a document could not be opened.
///
/// The viewer surface renders a distinct diagnostic for each cause; none of
/// these propagate past the load boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("document not found: {path}")]
    NotFound { path: String },

    #[error("could not read document: {detail}")]
    Transport { detail: String },

    #[error("document could not be parsed: {detail}")]
    Malformed { detail: String },
}

impl LoadError {
    /// User-facing diagnostic drawn in place of the page
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            LoadError::NotFound { path } => {
                format!("Document not found\n{path}")
            }
            LoadError::Transport { detail } => {
                format!("Could not read document\n{detail}")
            }
            LoadError::Malformed { detail } => {
                format!("Document could not be opened\n{detail}")
            }
        }
    }
}

/// Errors from rendering an already-open document
#[derive(Debug, thiserror::Error)]
pub enum RenderFault {
    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Engine(#[from] mupdf::error::Error),

    #[error("{detail}")]
    Generic { detail: String },
}

impl RenderFault {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// Opens documents; owned by the render worker thread
pub trait DocumentBackend: Send + 'static {
    type Handle: DocumentHandle;

    fn open(&self, path: &Path) -> Result<Self::Handle, LoadError>;
}

/// An opened document. Lives entirely on the worker thread.
pub trait DocumentHandle {
    fn page_count(&self) -> usize;

    /// Page dimensions in document units at scale 1.0 (1-based page number)
    fn natural_size(&self, page: usize) -> Result<(f32, f32), RenderFault>;

    /// Rasterize a page at the given scale (1-based page number)
    fn render_page(&self, page: usize, scale: f32) -> Result<PageBitmap, RenderFault>;
}

#[cfg(feature = "pdf")]
pub use mupdf_backend::MupdfBackend;

#[cfg(feature = "pdf")]
mod mupdf_backend {
    use super::{DocumentBackend, DocumentHandle, LoadError, PageBitmap, RenderFault};
    use mupdf::{Colorspace, Document, Matrix, Pixmap};
    use std::path::Path;

    /// MuPDF-backed document source
    pub struct MupdfBackend;

    pub struct MupdfHandle {
        doc: Document,
        page_count: usize,
    }

    impl DocumentBackend for MupdfBackend {
        type Handle = MupdfHandle;

        fn open(&self, path: &Path) -> Result<MupdfHandle, LoadError> {
            let display = path.display().to_string();

            if !path.exists() {
                return Err(LoadError::NotFound { path: display });
            }
            if let Err(e) = std::fs::metadata(path) {
                return Err(LoadError::Transport {
                    detail: e.to_string(),
                });
            }

            let doc = Document::open(path.to_string_lossy().as_ref()).map_err(|e| {
                LoadError::Malformed {
                    detail: e.to_string(),
                }
            })?;
            let page_count = doc.page_count().map_err(|e| LoadError::Malformed {
                detail: e.to_string(),
            })? as usize;

            Ok(MupdfHandle { doc, page_count })
        }
    }

    impl DocumentHandle for MupdfHandle {
        fn page_count(&self) -> usize {
            self.page_count
        }

        fn natural_size(&self, page_num: usize) -> Result<(f32, f32), RenderFault> {
            let page = self.doc.load_page(page_index(page_num))?;
            let bounds = page.bounds()?;
            Ok((bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
        }

        fn render_page(&self, page_num: usize, scale: f32) -> Result<PageBitmap, RenderFault> {
            let page = self.doc.load_page(page_index(page_num))?;
            let transform = Matrix::new_scale(scale, scale);
            let rgb = Colorspace::device_rgb();
            let pixmap = page.to_pixmap(&transform, &rgb, false, false)?;
            let pixels = pixmap_to_rgb(&pixmap)?;

            Ok(PageBitmap {
                pixels,
                width_px: pixmap.width(),
                height_px: pixmap.height(),
            })
        }
    }

    /// Pages are 1-based at the API surface, 0-based in MuPDF
    fn page_index(page: usize) -> i32 {
        page.saturating_sub(1) as i32
    }

    fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, RenderFault> {
        let n = pixmap.n() as usize;
        if n < 3 {
            return Err(RenderFault::generic(format!(
                "Unsupported pixmap format: {n} channels"
            )));
        }

        let width = pixmap.width() as usize;
        let height = pixmap.height() as usize;
        let stride = pixmap.stride() as usize;
        let samples = pixmap.samples();
        let row_bytes = width * n;
        if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
            return Err(RenderFault::generic("Pixmap buffer size mismatch"));
        }

        let mut out = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            let row = &samples[y * stride..y * stride + row_bytes];
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_distinguish_causes() {
        let not_found = LoadError::NotFound {
            path: "x.pdf".into(),
        };
        let transport = LoadError::Transport {
            detail: "connection refused".into(),
        };
        let malformed = LoadError::Malformed {
            detail: "bad xref".into(),
        };

        let messages = [
            not_found.diagnostic(),
            transport.diagnostic(),
            malformed.diagnostic(),
        ];
        assert!(messages[0].contains("not found"));
        assert!(messages[1].contains("Could not read"));
        assert!(messages[2].contains("could not be opened"));

        // All three surface differently
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn open_missing_file_is_not_found() {
        let err = MupdfBackend
            .open(std::path::Path::new("/no/such/lesson.pdf"))
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }
}
