//! Review prompt construction.

use std::path::Path;

use crate::review::LineMap;

/// Builds the review prompt for one file.
///
/// The prompt lists the added lines with their post-image numbers, the full
/// post-image content for context, and the block format that
/// [`crate::review::parse_feedback`] understands.
#[must_use]
pub fn build_review_prompt(filename: &str, content: &str, changed: &LineMap) -> String {
    let extension = Path::new(filename)
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or_default();
    let changed_lines = changed
        .iter()
        .map(|line| format!("Line {}: {}", line.number, line.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        concat!(
            "You are a senior developer reviewing changes to a .{extension} file.\n",
            "Give specific, actionable feedback on code quality, likely bugs, ",
            "security problems, performance, and readability.\n",
            "\n",
            "File: {filename}\n",
            "\n",
            "Changed lines (with line numbers):\n",
            "```\n",
            "{changed_lines}\n",
            "```\n",
            "\n",
            "Full file:\n",
            "```{extension}\n",
            "{content}\n",
            "```\n",
            "\n",
            "Write each piece of feedback as a block:\n",
            "ISSUE: <brief description of the issue>\n",
            "LINE: <line number from the changed lines above>\n",
            "SUGGESTION: <specific improvement>\n",
            "---\n",
            "\n",
            "Always use a LINE number from the changed lines listed above. ",
            "Start lines that praise a change with '+' and lines that flag a ",
            "problem with '-'.\n"
        ),
        extension = extension,
        filename = filename,
        changed_lines = changed_lines,
        content = content,
    )
}
