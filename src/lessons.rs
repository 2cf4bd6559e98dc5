//! Lesson discovery
//!
//! A lessons directory either carries a `lessons.yaml` manifest or is
//! scanned for PDF files, one lesson per document. Recording durations come
//! from the manifest; scanned lessons have no recordings.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MANIFEST_FILENAME: &str = "lessons.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub title: String,
    pub path: PathBuf,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,

    /// Document path, relative to the lessons directory unless absolute
    #[serde(default)]
    pub document: Option<PathBuf>,

    #[serde(default)]
    pub recordings: Vec<Recording>,

    /// Whether the section starts expanded
    #[serde(default)]
    pub open: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonSet {
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Resolve a lesson-relative path against the lessons directory.
///
/// Documents are addressed relative to the directory the lessons were
/// loaded from, so sessions must not depend on the process working
/// directory. Absolute paths pass through untouched.
#[must_use]
pub fn resolve_lesson_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load lessons from `dir`: manifest if present, directory scan otherwise.
/// A missing or unreadable directory yields an empty set.
#[must_use]
pub fn load_lessons(dir: &Path) -> LessonSet {
    let manifest = dir.join(MANIFEST_FILENAME);
    if manifest.exists() {
        match std::fs::read_to_string(&manifest) {
            Ok(content) => match serde_yaml::from_str::<LessonSet>(&content) {
                Ok(set) => {
                    debug!("Loaded {} lessons from {manifest:?}", set.lessons.len());
                    return set;
                }
                Err(e) => warn!("Failed to parse {manifest:?}: {e}"),
            },
            Err(e) => warn!("Failed to read {manifest:?}: {e}"),
        }
    }

    scan_for_documents(dir)
}

fn scan_for_documents(dir: &Path) -> LessonSet {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read lessons directory {dir:?}: {e}");
            return LessonSet::default();
        }
    };

    let mut documents: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let ext = path.extension()?.to_str()?;
            if ext.eq_ignore_ascii_case("pdf") {
                Some(path)
            } else {
                None
            }
        })
        .collect();
    documents.sort();

    let lessons = documents
        .into_iter()
        .map(|path| {
            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Untitled".to_string());
            Lesson {
                title,
                document: Some(path),
                recordings: Vec::new(),
                open: false,
            }
        })
        .collect();

    LessonSet { lessons }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/srv/lessons");
        let resolved = resolve_lesson_path(base, Path::new("unit1/intro.pdf"));
        assert_eq!(resolved, PathBuf::from("/srv/lessons/unit1/intro.pdf"));
    }

    #[test]
    fn absolute_paths_pass_through() {
        let base = Path::new("/srv/lessons");
        let resolved = resolve_lesson_path(base, Path::new("/data/shared.pdf"));
        assert_eq!(resolved, PathBuf::from("/data/shared.pdf"));
    }

    #[test]
    fn missing_directory_yields_empty_set() {
        let set = load_lessons(Path::new("/definitely/not/here"));
        assert!(set.lessons.is_empty());
    }

    #[test]
    fn scan_picks_up_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b-unit.pdf"), b"%PDF-").unwrap();
        std::fs::write(dir.path().join("a-unit.PDF"), b"%PDF-").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();

        let set = load_lessons(dir.path());
        let titles: Vec<_> = set.lessons.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["a-unit", "b-unit"]);
        assert!(set.lessons.iter().all(|l| l.document.is_some()));
    }

    #[test]
    fn manifest_takes_precedence_over_scan() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ignored.pdf"), b"%PDF-").unwrap();
        std::fs::write(
            dir.path().join("lessons.yaml"),
            "lessons:\n  - title: First lesson\n    document: unit1.pdf\n    recordings:\n      - title: Reading\n        path: unit1.mp3\n        duration_secs: 120.0\n",
        )
        .unwrap();

        let set = load_lessons(dir.path());
        assert_eq!(set.lessons.len(), 1);
        assert_eq!(set.lessons[0].title, "First lesson");
        assert_eq!(set.lessons[0].recordings.len(), 1);
        assert_eq!(set.lessons[0].recordings[0].duration_secs, 120.0);
    }
}
