use crate::lines::LineSequence;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Half-open interval `[start, end)` over a line sequence, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    start: usize,
    end: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("Invalid line range: [{start}, {end}) must be non-empty")]
    InvalidRange { start: usize, end: usize },

    #[error("Line range [{start}, {end}) is out of bounds for a file of {len} lines")]
    OutOfRange { start: usize, end: usize, len: usize },
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Result<Self, SpliceError> {
        if start >= end {
            return Err(SpliceError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Const constructor for ranges known at compile time.
    ///
    /// Panics (at compile time when used in a `const`) if `start >= end`.
    pub const fn fixed(start: usize, end: usize) -> Self {
        assert!(start < end, "line range must be non-empty");
        Self { start, end }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of lines the range removes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Index of the last line inside the range.
    pub fn last(&self) -> usize {
        self.end - 1
    }

    /// Ensure every index in the range exists in a sequence of `len` lines.
    pub fn check(&self, len: usize) -> Result<(), SpliceError> {
        if self.end > len {
            return Err(SpliceError::OutOfRange {
                start: self.start,
                end: self.end,
                len,
            });
        }
        Ok(())
    }
}

/// Build `target[..start] + replacement + target[end..]`.
///
/// Lines inside the range are dropped; every other line is copied verbatim.
pub fn splice_lines(
    target: &LineSequence,
    range: LineRange,
    replacement: &LineSequence,
) -> Result<LineSequence, SpliceError> {
    range.check(target.len())?;

    let lines = target.as_slice();
    let mut out = Vec::with_capacity(target.len() - range.len() + replacement.len());
    out.extend_from_slice(&lines[..range.start]);
    out.extend_from_slice(replacement.as_slice());
    out.extend_from_slice(&lines[range.end..]);

    Ok(LineSequence::from(out))
}

/// True if `replacement` already sits in `target` starting at `start`.
///
/// An empty replacement never counts as applied. A first run whose
/// replacement equals the leading lines of the range also matches, so such a
/// patch is reported as applied even though the tail of the range was never
/// removed.
pub fn is_spliced_at(target: &LineSequence, start: usize, replacement: &LineSequence) -> bool {
    if replacement.is_empty() {
        return false;
    }
    target
        .as_slice()
        .get(start..start + replacement.len())
        .is_some_and(|window| window == replacement.as_slice())
}

/// Atomic file write: tempfile + fsync + rename, then bump mtime.
///
/// Either the full new content lands or the original file stays untouched.
/// Symlinks are followed, so the linked file is the one rewritten.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let resolved = std::fs::canonicalize(path)?;
    let path = resolved.as_path();

    // Same directory keeps the rename on one filesystem
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    if let Ok(meta) = std::fs::metadata(path) {
        temp.as_file().set_permissions(meta.permissions())?;
    }
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    filetime::set_file_mtime(path, filetime::FileTime::now())?;

    Ok(())
}
