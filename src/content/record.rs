use crate::content::Category;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub slug: String,
    pub title: String,
    /// "Week 3", or the file stem when no week marker exists.
    pub group_label: String,
    pub category: Category,
    pub summary: String,
    /// ISO-like, so lexical order is chronological. Empty when absent.
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Rendered HTML, only present on records fetched individually.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ContentRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            category: self.category.clone(),
            slug: self.slug.clone(),
        }
    }

    /// First integer in the group label, or 0.
    pub fn week_number(&self) -> u64 {
        let digits = self
            .group_label
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>();
        digits.parse().unwrap_or(0)
    }
}

/// Identifies one record across all categories. Slugs alone are only unique
/// within a single category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub category: Category,
    pub slug: String,
}

impl RecordKey {
    pub fn post(slug: impl Into<String>) -> Self {
        Self {
            category: Category::Writing,
            slug: slug.into(),
        }
    }
}

/// `My First Post.md` -> `my-first-post`.
pub fn slugify(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    let mut slug = String::with_capacity(stem.len());
    let mut in_whitespace = false;
    for c in stem.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(slugify("My First Post.md"), "my-first-post");
        assert_eq!(slugify("week  12\tnotes.md"), "week-12-notes");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn week_number_defaults_to_zero() {
        let mut record = ContentRecord {
            slug: "x".to_owned(),
            title: "x".to_owned(),
            group_label: "Week 14".to_owned(),
            category: Category::Writing,
            summary: String::new(),
            date: String::new(),
            image: None,
            body: None,
        };
        assert_eq!(record.week_number(), 14);
        record.group_label = "retrospective".to_owned();
        assert_eq!(record.week_number(), 0);
    }
}
