//! Shareable location identifiers.
//!
//! - nothing selected: `/`
//! - writing: `/?post=<slug>`
//! - work update: `/?update=<project>/<slug>`

use crate::content::{Category, ProjectTag, RecordKey};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const BASE: &str = "/";
pub const POST_PARAM: &str = "post";
pub const UPDATE_PARAM: &str = "update";

/// RFC 3986 unreserved characters stay as they are; `/` is escaped so it can
/// separate project from slug.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Query string (with leading `?`) selecting `key`.
pub fn query(key: &RecordKey) -> String {
    let slug = utf8_percent_encode(&key.slug, COMPONENT);
    match &key.category {
        Category::Writing => format!("?{POST_PARAM}={slug}"),
        Category::Update(project) => format!(
            "?{UPDATE_PARAM}={}/{slug}",
            utf8_percent_encode(project.as_str(), COMPONENT)
        ),
    }
}

pub fn encode(selection: Option<&RecordKey>) -> String {
    match selection {
        Some(key) => format!("{BASE}{}", query(key)),
        None => BASE.to_owned(),
    }
}

/// Output file of the page selecting `key`. The project/slug separator is
/// escaped too, so every page is a single file beside `/index.html`.
pub fn page_path(key: &RecordKey) -> String {
    format!("/index.html{}", query(key).replace('/', "%2F"))
}

/// Selection encoded in `location`, ignoring path, fragment and unrelated
/// parameters. The first recognized parameter wins.
pub fn decode(location: &str) -> Option<RecordKey> {
    let location = location.split_once('#').map_or(location, |(l, _)| l);
    let (_, query) = location.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        match name {
            POST_PARAM => Some(RecordKey {
                category: Category::Writing,
                slug: decode_component(value)?,
            }),
            UPDATE_PARAM => {
                let (project, slug) = value.split_once('/')?;
                Some(RecordKey {
                    category: Category::Update(ProjectTag::new(decode_component(project)?)),
                    slug: decode_component(slug)?,
                })
            }
            _ => None,
        }
    })
}

fn decode_component(value: &str) -> Option<String> {
    let decoded = percent_decode_str(value).decode_utf8().ok()?;
    (!decoded.is_empty()).then(|| decoded.into_owned())
}
