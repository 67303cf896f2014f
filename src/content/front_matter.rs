use serde_yaml::{Mapping, Value};
use tracing::warn;

/// Recognized keys of the YAML header. Anything else is ignored.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    /// `description`, or `summary` as used by work updates.
    pub description: Option<String>,
    pub image: Option<String>,
}

impl FrontMatter {
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let value = serde_yaml::from_str::<Value>(yaml)?;
        let mapping = if let Value::Mapping(mapping) = value {
            mapping
        } else {
            // Empty header, or a bare scalar.
            return Ok(Self::default());
        };
        Ok(Self {
            title: scalar(&mapping, "title"),
            date: scalar(&mapping, "date"),
            description: scalar(&mapping, "description").or_else(|| scalar(&mapping, "summary")),
            image: scalar(&mapping, "image"),
        })
    }
}

fn scalar(mapping: &Mapping, key: &str) -> Option<String> {
    match mapping.get(key)? {
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

/// Splits `text` into front matter and body. Malformed headers are logged and
/// treated as empty so derived values take over.
pub fn parse_document<'a>(text: &'a str, file_name: &str) -> (FrontMatter, &'a str) {
    match split(text) {
        (Some(header), body) => {
            let front_matter = FrontMatter::parse(header).unwrap_or_else(|e| {
                warn!("ignoring malformed front matter in {file_name}: {e}");
                FrontMatter::default()
            });
            (front_matter, body)
        }
        (None, body) => (FrontMatter::default(), body),
    }
}

/// Header must open on the very first line. Without a closing delimiter, the
/// whole file is body.
fn split(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    if first.trim_end() != "---" {
        return (None, text);
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_header_from_body() {
        let (front_matter, body) = parse_document(
            "---\ntitle: Hello\ndate: 2024-01-01\nsummary: short\n---\n# Heading\ntext\n",
            "a.md",
        );
        assert_eq!(front_matter.title.as_deref(), Some("Hello"));
        assert_eq!(front_matter.date.as_deref(), Some("2024-01-01"));
        assert_eq!(front_matter.description.as_deref(), Some("short"));
        assert_eq!(body, "# Heading\ntext\n");
    }

    #[test]
    fn description_wins_over_summary() {
        let front_matter =
            FrontMatter::parse("description: long form\nsummary: short form\n").unwrap();
        assert_eq!(front_matter.description.as_deref(), Some("long form"));
    }

    #[test]
    fn no_header_is_all_body() {
        let text = "# Hello\nWorld intro text.";
        let (front_matter, body) = parse_document(text, "a.md");
        assert_eq!(front_matter, FrontMatter::default());
        assert_eq!(body, text);
    }

    #[test]
    fn unterminated_header_is_all_body() {
        let text = "---\ntitle: Hello\n# Heading";
        let (front_matter, body) = parse_document(text, "a.md");
        assert_eq!(front_matter, FrontMatter::default());
        assert_eq!(body, text);
    }

    #[test]
    fn malformed_yaml_falls_back() {
        let (front_matter, body) = parse_document("---\ntitle: [unclosed\n---\nbody", "a.md");
        assert_eq!(front_matter, FrontMatter::default());
        assert_eq!(body, "body");
    }

    #[test]
    fn blank_values_are_absent() {
        let front_matter = FrontMatter::parse("title: ''\nimage: /cover.png\n").unwrap();
        assert_eq!(front_matter.title, None);
        assert_eq!(front_matter.image.as_deref(), Some("/cover.png"));
    }

    #[test]
    fn crlf_delimiters() {
        let (front_matter, body) = parse_document("---\r\ndate: 2023-05-06\r\n---\r\nbody", "a.md");
        assert_eq!(front_matter.date.as_deref(), Some("2023-05-06"));
        assert_eq!(body, "body");
    }
}
