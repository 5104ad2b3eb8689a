//! Parsing of free-text model feedback into line-anchored comments.
//!
//! The model is asked to answer in blocks of the form:
//!
//! ```text
//! ISSUE: short description
//! LINE: 12
//! SUGGESTION: what to do instead
//! ---
//! ```
//!
//! Anything else in the response is ignored. Blocks end at a `---` separator
//! or a blank line.

const ISSUE_PREFIX: &str = "ISSUE:";
const LINE_PREFIX: &str = "LINE:";
const SUGGESTION_PREFIX: &str = "SUGGESTION:";
const BLOCK_SEPARATOR: &str = "---";

/// A feedback item anchored to a post-image line that the patch added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewComment {
    /// Post-image line number the comment is attached to.
    pub line: u32,
    /// Issue text, followed by any suggestions.
    pub body: String,
}

/// The single record under construction while scanning a response.
#[derive(Debug, Default)]
struct PendingComment {
    line: Option<u32>,
    body: String,
}

impl PendingComment {
    fn set_issue(&mut self, issue: &str) {
        issue.trim().clone_into(&mut self.body);
    }

    fn append_suggestion(&mut self, suggestion: &str) {
        self.body.push_str("\n\nSuggestion: ");
        self.body.push_str(suggestion.trim());
    }

    fn resolve_line(&mut self, requested: &str, valid_lines: &[u32]) {
        let candidate = first_number(requested).filter(|line| valid_lines.contains(line));
        self.line = candidate.or_else(|| valid_lines.first().copied());
    }

    /// Moves the record out when it carries a body, leaving an empty slot.
    fn take_if_complete(&mut self) -> Option<Self> {
        if self.body.is_empty() {
            None
        } else {
            Some(std::mem::take(self))
        }
    }

    fn into_comment(self) -> Option<ReviewComment> {
        let line = self.line?;
        Some(ReviewComment {
            line,
            body: self.body,
        })
    }
}

/// Converts a model response into comments anchored to `valid_lines`.
///
/// `valid_lines` should be the added lines of the file under review, in the
/// order the patch introduced them. A `LINE:` value that is missing, not a
/// number, or not one of `valid_lines` falls back to the first valid line,
/// so such feedback lands on the first change of the file rather than being
/// lost. When `valid_lines` is empty no line can be resolved and nothing is
/// returned.
///
/// A `LINE:` that appears before any `ISSUE:` survives a block separator and
/// applies to the next record.
///
/// # Examples
///
/// ```
/// use patchwise::review::{ReviewComment, parse_feedback};
///
/// let comments = parse_feedback("ISSUE: missing check\nLINE: 99\n---", &[5, 8]);
/// assert_eq!(
///     comments,
///     vec![ReviewComment { line: 5, body: "missing check".to_owned() }]
/// );
/// ```
#[must_use]
pub fn parse_feedback(text: &str, valid_lines: &[u32]) -> Vec<ReviewComment> {
    let mut completed = Vec::new();
    let mut pending = PendingComment::default();

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.is_empty() || line == BLOCK_SEPARATOR {
            completed.extend(pending.take_if_complete());
            continue;
        }

        if let Some(issue) = line.strip_prefix(ISSUE_PREFIX) {
            pending.set_issue(issue);
        } else if let Some(requested) = line.strip_prefix(LINE_PREFIX) {
            pending.resolve_line(requested, valid_lines);
        } else if let Some(suggestion) = line.strip_prefix(SUGGESTION_PREFIX) {
            pending.append_suggestion(suggestion);
        }
    }
    completed.extend(pending.take_if_complete());

    completed
        .into_iter()
        .filter_map(PendingComment::into_comment)
        .collect()
}

/// Parses the first run of ASCII digits in `text`.
fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|character: char| character.is_ascii_digit())?;
    let digits = text.get(start..)?;
    let end = digits
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(digits.len());
    digits.get(..end)?.parse().ok()
}
