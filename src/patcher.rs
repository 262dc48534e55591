//! The one-shot `showMentionSuggestions` patch.
//!
//! [`Patcher`] replaces a fixed line range of the target file with the full
//! contents of a snippet file. The only safety net is a marker check on the
//! first line of the range, performed before anything is written.
//!
//! The work is split in two phases so callers can show the range being
//! removed before deciding anything:
//!
//! 1. [`PatchPlan::load`] reads both files and captures the boundary lines.
//! 2. [`PatchPlan::commit`] verifies the marker and rewrites the target.

use crate::lines::{strip_terminator, LineSequence};
use crate::splice::{atomic_write, is_spliced_at, splice_lines, LineRange, SpliceError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

/// File being edited in place.
pub const TARGET_PATH: &str = "app.js";
/// File whose full contents replace the range.
pub const SNIPPET_PATH: &str = "snippet.js";
/// First removed line (file line 1984).
pub const START_OFFSET: usize = 1983;
/// One past the last removed line (file line 2029).
pub const END_OFFSET: usize = 2029;
/// Must occur in the line at [`START_OFFSET`].
pub const EXPECTED_MARKER: &str = "showMentionSuggestions";
/// Lines 1984 through 2029 of the target, inclusive.
pub const PATCH_RANGE: LineRange = LineRange::fixed(START_OFFSET, END_OFFSET);

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Line {line} of {} does not contain expected marker {marker:?} (found {found:?})", .file.display())]
    PreconditionFailed {
        file: PathBuf,
        /// 1-based line number
        line: usize,
        marker: String,
        found: String,
    },

    #[error("Snippet is already present at line {line} of {}", .file.display())]
    AlreadyApplied { file: PathBuf, line: usize },

    #[error("Cannot patch {}: {source}", .file.display())]
    IndexOutOfRange {
        file: PathBuf,
        #[source]
        source: SpliceError,
    },

    #[error("{} changed on disk after it was read", .file.display())]
    TargetChanged { file: PathBuf },

    #[error("File I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PatchError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| PatchError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The two original lines that delimit the removed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// 1-based line number of the first removed line
    pub first_line: usize,
    pub first: String,
    /// 1-based line number of the last removed line
    pub last_line: usize,
    pub last: String,
}

/// Outcome of a successful patch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchReport describes what was written"]
pub struct PatchReport {
    pub file: PathBuf,
    pub boundary: Boundary,
    pub lines_before: usize,
    /// Lines in the written file as it re-reads from disk. A snippet without
    /// a final newline merges with the line after the range.
    pub lines_after: usize,
    pub removed: usize,
    pub inserted: usize,
}

/// Parameters of a single patch run.
///
/// `Patcher::default()` carries the literal constants of this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patcher {
    pub target: PathBuf,
    pub snippet: PathBuf,
    pub range: LineRange,
    pub marker: String,
}

impl Default for Patcher {
    fn default() -> Self {
        Self {
            target: PathBuf::from(TARGET_PATH),
            snippet: PathBuf::from(SNIPPET_PATH),
            range: PATCH_RANGE,
            marker: EXPECTED_MARKER.to_string(),
        }
    }
}

impl Patcher {
    pub fn new(
        target: impl Into<PathBuf>,
        snippet: impl Into<PathBuf>,
        range: LineRange,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            snippet: snippet.into(),
            range,
            marker: marker.into(),
        }
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<PathBuf>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn plan(&self) -> Result<PatchPlan, PatchError> {
        PatchPlan::load(self)
    }

    /// Load, verify and write in one go.
    pub fn apply(&self) -> Result<PatchReport, PatchError> {
        self.plan()?.commit()
    }
}

/// Both files loaded into memory, nothing written yet.
#[derive(Debug, Clone)]
pub struct PatchPlan {
    target_path: PathBuf,
    target: LineSequence,
    snippet: LineSequence,
    range: LineRange,
    marker: String,
    original_hash: u64,
    boundary: Boundary,
}

impl PatchPlan {
    /// Read target and snippet, and capture the boundary lines.
    ///
    /// Fails with [`PatchError::IndexOutOfRange`] if the target has fewer
    /// lines than the range end.
    pub fn load(patcher: &Patcher) -> Result<Self, PatchError> {
        let raw = fs::read_to_string(&patcher.target).map_err(PatchError::io(&patcher.target))?;
        let original_hash = xxh3_64(raw.as_bytes());
        let target = LineSequence::parse(&raw);
        let snippet =
            LineSequence::read(&patcher.snippet).map_err(PatchError::io(&patcher.snippet))?;

        debug!(
            target = %patcher.target.display(),
            target_lines = target.len(),
            snippet_lines = snippet.len(),
            "loaded patch inputs"
        );

        let range = patcher.range;
        range
            .check(target.len())
            .map_err(|source| PatchError::IndexOutOfRange {
                file: patcher.target.clone(),
                source,
            })?;

        let boundary = Boundary {
            first_line: range.start() + 1,
            first: strip_terminator(&target[range.start()]).to_string(),
            last_line: range.last() + 1,
            last: strip_terminator(&target[range.last()]).to_string(),
        };

        Ok(Self {
            target_path: patcher.target.clone(),
            target,
            snippet,
            range,
            marker: patcher.marker.clone(),
            original_hash,
            boundary,
        })
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn original(&self) -> &LineSequence {
        &self.target
    }

    /// Check the marker, then refuse to splice the snippet in twice.
    pub fn verify(&self) -> Result<(), PatchError> {
        let start = self.range.start();
        let line = &self.target[start];

        if !line.contains(self.marker.as_str()) {
            warn!(
                file = %self.target_path.display(),
                line = start + 1,
                marker = %self.marker,
                "marker not found, refusing to patch"
            );
            return Err(PatchError::PreconditionFailed {
                file: self.target_path.clone(),
                line: start + 1,
                marker: self.marker.clone(),
                found: strip_terminator(line).to_string(),
            });
        }

        if is_spliced_at(&self.target, start, &self.snippet) {
            return Err(PatchError::AlreadyApplied {
                file: self.target_path.clone(),
                line: start + 1,
            });
        }

        Ok(())
    }

    /// The patched line sequence, without touching the filesystem.
    pub fn spliced(&self) -> Result<LineSequence, PatchError> {
        splice_lines(&self.target, self.range, &self.snippet).map_err(|source| {
            PatchError::IndexOutOfRange {
                file: self.target_path.clone(),
                source,
            }
        })
    }

    /// Verify, then overwrite the target with the spliced content.
    ///
    /// The target is re-read first; if its bytes no longer match what was
    /// loaded the write is abandoned.
    pub fn commit(self) -> Result<PatchReport, PatchError> {
        self.verify()?;

        let output = self.spliced()?.join();

        let current = fs::read(&self.target_path).map_err(PatchError::io(&self.target_path))?;
        if xxh3_64(&current) != self.original_hash {
            return Err(PatchError::TargetChanged {
                file: self.target_path,
            });
        }

        atomic_write(&self.target_path, output.as_bytes())
            .map_err(PatchError::io(&self.target_path))?;

        info!(
            file = %self.target_path.display(),
            removed = self.range.len(),
            inserted = self.snippet.len(),
            "patch written"
        );

        Ok(PatchReport {
            file: self.target_path,
            boundary: self.boundary,
            lines_before: self.target.len(),
            lines_after: LineSequence::parse(&output).len(),
            removed: self.range.len(),
            inserted: self.snippet.len(),
        })
    }
}

/// Replace lines `[start_offset, end_offset)` of `target_path` with the
/// contents of `snippet_path`, provided the line at `start_offset` contains
/// `expected_marker`.
pub fn apply_patch(
    target_path: impl Into<PathBuf>,
    snippet_path: impl Into<PathBuf>,
    start_offset: usize,
    end_offset: usize,
    expected_marker: &str,
) -> Result<PatchReport, PatchError> {
    let target_path = target_path.into();
    let range =
        LineRange::new(start_offset, end_offset).map_err(|source| PatchError::IndexOutOfRange {
            file: target_path.clone(),
            source,
        })?;
    Patcher::new(target_path, snippet_path, range, expected_marker).apply()
}
