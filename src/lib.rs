//! Mention Patcher: one-shot verified line-range splice
//!
//! Replaces lines 1984-2029 of `app.js` (the old `showMentionSuggestions`
//! function) with the contents of `snippet.js`, refusing to touch the file
//! unless the first line of that range still contains the expected marker.
//!
//! # Architecture
//!
//! Everything compiles down to [`splice::splice_lines`]: keep the lines
//! before the range, insert the replacement verbatim, keep the lines after.
//! Files are handled as terminator-preserving [`LineSequence`]s so content
//! outside the range round-trips byte-for-byte.
//!
//! # Safety
//!
//! - Marker check before any write
//! - Refuses to splice the same snippet in twice
//! - Target re-hashed (xxh3) right before the write
//! - Atomic file writes (tempfile + fsync + rename)
//!
//! # Example
//!
//! ```no_run
//! use mention_patcher::Patcher;
//!
//! match Patcher::default().apply() {
//!     Ok(report) => println!("Patched {} lines", report.removed),
//!     Err(e) => eprintln!("Patch failed: {}", e),
//! }
//! ```

pub mod lines;
pub mod patcher;
pub mod splice;

// Re-exports
pub use lines::LineSequence;
pub use patcher::{
    apply_patch, Boundary, PatchError, PatchPlan, PatchReport, Patcher, END_OFFSET,
    EXPECTED_MARKER, PATCH_RANGE, SNIPPET_PATH, START_OFFSET, TARGET_PATH,
};
pub use splice::{LineRange, SpliceError};
