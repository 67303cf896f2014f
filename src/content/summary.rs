use regex::Regex;
use std::sync::LazyLock;

/// Accumulation stops once the joined paragraph is longer than this.
pub const SUMMARY_SOFT_LIMIT: usize = 150;
/// Longer summaries are cut to exactly this many characters plus an ellipsis.
pub const SUMMARY_HARD_LIMIT: usize = 200;

static FIRST_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").expect("valid heading regex"));

static WEEK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)week\s*(\d+)").expect("valid week regex"));

/// Text of the first level-one heading.
pub fn first_heading(body: &str) -> Option<String> {
    FIRST_HEADING
        .captures(body)
        .map(|c| c[1].trim().to_owned())
        .filter(|title| !title.is_empty())
}

/// First paragraph following the first heading.
pub fn extract_summary(body: &str) -> String {
    let mut lines = Vec::<&str>::new();
    let mut found_first_heading = false;

    for line in body.lines() {
        if line.starts_with('#') {
            found_first_heading = true;
            continue;
        }

        let trimmed = line.trim();
        if found_first_heading && !trimmed.is_empty() {
            lines.push(trimmed);
            if lines.join(" ").chars().count() > SUMMARY_SOFT_LIMIT {
                break;
            }
        }

        if !lines.is_empty() && trimmed.is_empty() {
            break;
        }
    }

    let summary = lines.join(" ");
    if summary.chars().count() > SUMMARY_HARD_LIMIT {
        let mut truncated = summary
            .chars()
            .take(SUMMARY_HARD_LIMIT)
            .collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        summary
    }
}

/// `Week N` from the file name, else from the title, else the file stem.
pub fn group_label(file_name: &str, title: &str) -> String {
    [file_name, title]
        .into_iter()
        .find_map(|haystack| WEEK_MARKER.captures(haystack))
        .map(|c| format!("Week {}", &c[1]))
        .unwrap_or_else(|| file_name.strip_suffix(".md").unwrap_or(file_name).to_owned())
}
