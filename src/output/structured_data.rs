use crate::{config::SiteConfig, content::ContentRecord};
use serde::Serialize;
use tracing::warn;
use yew::Html;

pub fn write_structured_data<T: Serialize>(data: T) -> Html {
    #[derive(Serialize)]
    struct Context<T> {
        #[serde(rename = "@context")]
        context: &'static str,
        #[serde(flatten)]
        data: T,
    }

    match serde_json::to_string_pretty(&Context {
        context: "https://schema.org",
        data,
    }) {
        // Content is author-controlled; keep `</script>` from closing the tag.
        Ok(json) => Html::from_html_unchecked(
            format!(
                "<script type=\"application/ld+json\">\n{}\n</script>",
                json.replace('<', "\\u003c")
            )
            .into(),
        ),
        Err(e) => {
            warn!("skipping structured data: {e}");
            Html::default()
        }
    }
}

/// https://schema.org/Person
#[derive(Clone, Serialize)]
pub struct PersonStructuredData {
    #[serde(rename = "@type")]
    pub _type: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "sameAs", skip_serializing_if = "Vec::is_empty")]
    pub same_as: Vec<String>,
}

impl PersonStructuredData {
    pub fn new(config: &SiteConfig) -> Option<Self> {
        let profile = &config.profile;
        (!profile.name.is_empty()).then(|| Self {
            _type: "Person",
            name: profile.name.clone(),
            url: config.root_url.clone(),
            same_as: profile.links.iter().map(|l| l.url.clone()).collect(),
        })
    }
}

/// https://schema.org/WebSite
#[derive(Serialize)]
pub struct WebSiteStructuredData {
    #[serde(rename = "@type")]
    pub _type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<PersonStructuredData>,
}

/// https://schema.org/BlogPosting
#[derive(Serialize)]
pub struct BlogPostingStructuredData {
    #[serde(rename = "@type")]
    _type: &'static str,
    headline: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(rename = "datePublished", skip_serializing_if = "String::is_empty")]
    date_published: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<PersonStructuredData>,
}

pub fn record_structured_data(
    config: &SiteConfig,
    record: &ContentRecord,
    canonical: &str,
) -> BlogPostingStructuredData {
    BlogPostingStructuredData {
        _type: "BlogPosting",
        headline: record.title.clone(),
        description: record.summary.clone(),
        date_published: record.date.clone(),
        image: record
            .image
            .as_ref()
            .map(|image| config.absolute(image).unwrap_or_else(|| image.clone())),
        url: config.absolute(canonical),
        author: PersonStructuredData::new(config),
    }
}
