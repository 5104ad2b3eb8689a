//! Markdown rendering of review comment bodies.

const POSITIVE_HEADING: &str = "🟢 **Positive Suggestions:**";
const ISSUES_HEADING: &str = "🔴 **Potential Issues:**";

/// Renders a comment body for posting.
///
/// When the body mentions `+` anywhere, a positive-suggestions heading is
/// added followed by every body line that starts with `+`, each wrapped in
/// backticks. The same applies to `-` with a potential-issues heading. The
/// original body always follows after a blank line.
///
/// # Examples
///
/// ```
/// use patchwise::review::render_comment_body;
///
/// assert_eq!(render_comment_body("plain note"), "\nplain note");
/// ```
#[must_use]
pub fn render_comment_body(body: &str) -> String {
    let mut sections = Vec::with_capacity(5);

    if body.contains('+') {
        sections.push(POSITIVE_HEADING.to_owned());
        sections.push(marked_lines(body, '+'));
    }
    if body.contains('-') {
        sections.push(ISSUES_HEADING.to_owned());
        sections.push(marked_lines(body, '-'));
    }
    sections.push(format!("\n{body}"));

    sections.join("\n")
}

fn marked_lines(body: &str, marker: char) -> String {
    body.split('\n')
        .filter(|line| line.starts_with(marker))
        .map(|line| format!("`{line}` "))
        .collect()
}
