//! Mapping of unified-diff patches onto post-image line numbers.
//!
//! GitHub anchors review comments to post-image lines, so every added line
//! in a patch must be assigned the exact line number it has in the new file.
//! An off-by-one here silently attaches feedback to the wrong line.

use std::collections::BTreeMap;

/// One added line and its post-image position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedLine {
    /// Post-image line number (1-based).
    pub number: u32,
    /// Added content with the `+` prefix removed and whitespace trimmed.
    pub content: String,
}

/// Post-image line numbers of added lines mapped to their content.
///
/// Entries keep the order in which the patch introduced them. Line numbers
/// are unique; within one hunk they strictly increase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMap {
    entries: Vec<ChangedLine>,
    positions: BTreeMap<u32, usize>,
}

impl LineMap {
    /// Content of the added line at `number`, if the patch added one there.
    #[must_use]
    pub fn get(&self, number: u32) -> Option<&str> {
        self.positions
            .get(&number)
            .and_then(|&position| self.entries.get(position))
            .map(|entry| entry.content.as_str())
    }

    /// Added line numbers in first-seen order.
    #[must_use]
    pub fn changed_lines(&self) -> Vec<u32> {
        self.entries.iter().map(|entry| entry.number).collect()
    }

    /// Iterates over the added lines in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &ChangedLine> {
        self.entries.iter()
    }

    /// Number of added lines.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the patch added no lines.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn record(&mut self, number: u32, content: &str) {
        let trimmed = content.trim().to_owned();
        if let Some(existing) = self
            .positions
            .get(&number)
            .and_then(|&position| self.entries.get_mut(position))
        {
            existing.content = trimmed;
            return;
        }
        self.positions.insert(number, self.entries.len());
        self.entries.push(ChangedLine {
            number,
            content: trimmed,
        });
    }
}

impl<'map> IntoIterator for &'map LineMap {
    type Item = &'map ChangedLine;
    type IntoIter = std::slice::Iter<'map, ChangedLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Walks a single file's patch and returns the post-image numbers of its
/// added lines.
///
/// Each `@@ -a,b +c,d @@` header resets the counter so that the next line
/// is numbered `c`. Added lines advance the counter and are recorded,
/// context lines advance it without being recorded, and removed lines do not
/// exist in the post-image so they leave it untouched. `+++`/`---` file
/// markers, `\ No newline at end of file` markers, and empty lines are
/// skipped.
///
/// File markers only appear before the first hunk of a file (or after a
/// `diff ` line starting the next one). Inside a hunk, `+++i;` is the added
/// line `++i;` and `--- x` is a removed line.
///
/// Any other line is treated as context; the function never rejects input,
/// and a patch without hunk headers yields an empty map.
///
/// # Examples
///
/// ```
/// use patchwise::review::map_patch;
///
/// let map = map_patch("@@ -1,3 +10,4 @@\n context\n+foo\n-bar\n+baz");
/// assert_eq!(map.changed_lines(), vec![11, 13]);
/// assert_eq!(map.get(13), Some("baz"));
/// ```
#[must_use]
pub fn map_patch(patch: &str) -> LineMap {
    let mut map = LineMap::default();
    let mut current_line: u32 = 0;
    let mut in_hunk = false;

    for line in patch.lines() {
        if line.starts_with("@@") {
            if let Some(new_start) = parse_new_start(line) {
                current_line = new_start.saturating_sub(1);
                in_hunk = true;
            }
            continue;
        }

        if line.starts_with("diff ") {
            in_hunk = false;
            continue;
        }

        if !in_hunk && (line.starts_with("+++") || line.starts_with("---")) {
            continue;
        }

        if let Some(added) = line.strip_prefix('+') {
            current_line = current_line.saturating_add(1);
            map.record(current_line, added);
        } else if line.starts_with('-') || line.starts_with('\\') || line.is_empty() {
            // absent from the post-image
        } else {
            current_line = current_line.saturating_add(1);
        }
    }

    map
}

/// Extracts `c` from `@@ -a,b +c,d @@`.
fn parse_new_start(header: &str) -> Option<u32> {
    let (_, after_plus) = header.split_once('+')?;
    let digits_end = after_plus
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(after_plus.len());
    after_plus.get(..digits_end)?.parse().ok()
}
