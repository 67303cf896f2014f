use crate::{content::ContentRecord, output::Site, stats::VanityStats, view::location};
use serde::Serialize;
use tracing::warn;

/// Machine-readable index of everything listed on the page, without bodies.
pub fn render_api(site: Site<'_>) -> Vec<u8> {
    let api = Api {
        title: site.config.title.clone(),
        description: site.config.description.clone(),
        root_url: site.config.root_url.clone(),
        stats: ApiStats::from(site.stats.current()),
        posts: site.library.posts.iter().map(ApiRecord::new).collect(),
        updates: site.library.updates.iter().map(ApiRecord::new).collect(),
    };
    serde_json::to_vec(&api).unwrap_or_else(|e| {
        warn!("couldn't serialize api: {e}");
        Vec::new()
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Api<'a> {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    root_url: Option<String>,
    stats: ApiStats,
    posts: Vec<ApiRecord<'a>>,
    updates: Vec<ApiRecord<'a>>,
}

/// `VanityStats` keeps snake_case keys for `folio.toml`; the API is camelCase
/// throughout.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiStats {
    contributions: u64,
    stars: u64,
    repositories: u64,
    top_language: String,
}

impl From<VanityStats> for ApiStats {
    fn from(stats: VanityStats) -> Self {
        Self {
            contributions: stats.contributions,
            stars: stats.stars,
            repositories: stats.repositories,
            top_language: stats.top_language,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRecord<'a> {
    #[serde(flatten)]
    record: &'a ContentRecord,
    location: String,
}

impl<'a> ApiRecord<'a> {
    fn new(record: &'a ContentRecord) -> Self {
        Self {
            location: location::encode(Some(&record.key())),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::fixture;

    #[test]
    fn lists_records_with_locations() {
        let (_dir, config, library, stats) = fixture(
            "[[updates]]\nid = \"markus\"\nname = \"MarkUs\"\ndirectory = \"markus\"\n",
        );
        let site = Site {
            config: &config,
            library: &library,
            stats: &stats,
        };
        let api: serde_json::Value = serde_json::from_slice(&render_api(site)).unwrap();

        assert_eq!(api["title"], "Portfolio");
        assert_eq!(api["stats"]["topLanguage"], "TypeScript");
        assert_eq!(api["stats"]["contributions"], 847);
        assert!(api["stats"].get("top_language").is_none());

        let posts = api["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["slug"], "hello-world");
        assert_eq!(posts[0]["location"], "/?post=hello-world");
        assert_eq!(posts[0]["date"], "2024-03-01");

        let updates = api["updates"].as_array().unwrap();
        assert_eq!(updates[0]["location"], "/?update=markus/week2");
        assert_eq!(updates[0]["groupLabel"], "Week 2");
        assert_eq!(updates[0]["category"]["project"], "markus");
    }
}
