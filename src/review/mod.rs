//! The review pipeline: diff mapping, feedback parsing, and orchestration.
//!
//! [`map_patch`] turns a unified diff into post-image line numbers,
//! [`parse_feedback`] turns model output into comments anchored to those
//! lines, and [`ReviewOrchestrator`] drives both against GitHub and the
//! model.

mod feedback;
mod orchestrator;
mod patch;
mod render;

pub use feedback::{ReviewComment, parse_feedback};
pub use orchestrator::{FileChange, ReviewOrchestrator, ReviewSummary};
pub use patch::{ChangedLine, LineMap, map_patch};
pub use render::render_comment_body;
