use crate::{
    content::{Category, ContentSource, ProjectTag, SortBy},
    stats::VanityStats,
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("couldn't read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("update source {0:?} is declared twice")]
    DuplicateProject(String),
}

#[derive(Deserialize, Debug)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,
    pub description: Option<String>,
    pub root_url: Option<String>,
    #[serde(default = "default_output")]
    pub output: String,
    /// Directory of blog posts, relative to the config file.
    #[serde(default = "default_writing")]
    pub writing: String,
    #[serde(default)]
    pub updates: Vec<UpdateSourceConfig>,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub gallery: Vec<MediaConfig>,
    pub resume_url: Option<String>,
    #[serde(default)]
    pub github: GithubConfig,
    /// Directory resolving relative paths; the config file's parent.
    #[serde(skip)]
    pub root: PathBuf,
}

fn default_title() -> String {
    "Portfolio".to_owned()
}

fn default_output() -> String {
    String::from("./output")
}

fn default_writing() -> String {
    String::from("blog-posts")
}

#[derive(Deserialize, Debug, Clone)]
pub struct UpdateSourceConfig {
    /// Used in locations, e.g. `markus`.
    pub id: String,
    /// Display name, e.g. `MarkUs`.
    pub name: String,
    pub directory: String,
    pub url: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ProfileConfig {
    #[serde(default)]
    pub name: String,
    pub tagline: Option<String>,
    pub avatar: Option<String>,
    /// Markdown.
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

#[derive(Deserialize, Debug)]
pub struct LinkConfig {
    pub label: String,
    pub url: String,
}

#[derive(Deserialize, Debug)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct MediaConfig {
    pub src: String,
    #[serde(default)]
    pub kind: MediaKind,
    pub caption: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Photo,
    Video,
}

#[derive(Deserialize, Debug)]
pub struct GithubConfig {
    pub username: Option<String>,
    /// Environment variable holding a token for the GraphQL contribution
    /// count. Without one, contributions are estimated.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub fallback: VanityStats,
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_owned()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_cache_ttl_secs() -> u64 {
    60 * 60
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            username: None,
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            fallback: VanityStats::default(),
        }
    }
}

impl GithubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.is_empty())
    }
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.root = path
            .parent()
            .map(Path::to_owned)
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, source) in self.updates.iter().enumerate() {
            if self.updates[..i].iter().any(|s| s.id == source.id) {
                return Err(ConfigError::DuplicateProject(source.id.clone()));
            }
        }
        Ok(())
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path(&self.output)
    }

    /// Output path of `public` (which starts with `/`).
    pub fn subdirectory(&self, public: &str) -> PathBuf {
        self.output_dir().join(public.trim_start_matches('/'))
    }

    pub fn content_sources(&self) -> Vec<ContentSource> {
        std::iter::once(ContentSource::new(
            self.path(&self.writing),
            Category::Writing,
            SortBy::Date,
        ))
        .chain(self.updates.iter().map(|source| {
            ContentSource::new(
                self.path(&source.directory),
                Category::Update(ProjectTag::new(&source.id)),
                SortBy::Week,
            )
        }))
        .collect()
    }

    pub fn project_name<'a>(&'a self, project: &'a ProjectTag) -> &'a str {
        self.updates
            .iter()
            .find(|source| source.id == project.as_str())
            .map(|source| source.name.as_str())
            .unwrap_or(project.as_str())
    }

    /// Absolute URL of `public`, when the site's root is known.
    pub fn absolute(&self, public: &str) -> Option<String> {
        self.root_url
            .as_ref()
            .map(|root| format!("{}{public}", root.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = SiteConfig::parse("").unwrap();
        assert_eq!(config.title, "Portfolio");
        assert_eq!(config.writing, "blog-posts");
        assert_eq!(config.github.timeout(), Duration::from_secs(5));
        assert_eq!(config.github.fallback, VanityStats::default());
        assert_eq!(config.content_sources().len(), 1);
    }

    #[test]
    fn update_sources_become_categories() {
        let config = SiteConfig::parse(
            r#"
            title = "Jane Doe"
            root_url = "https://jane.dev/"

            [[updates]]
            id = "markus"
            name = "MarkUs"
            directory = "public/Markus"

            [[updates]]
            id = "pyta"
            name = "PythonTA"
            directory = "public/PythonTA"

            [[gallery]]
            src = "/clip.mp4"
            kind = "video"

            [github]
            username = "janedoe"
            fallback = { contributions = 1, stars = 2, repositories = 3, top_language = "Rust" }
            "#,
        )
        .unwrap();
        let sources = config.content_sources();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[2].category, Category::Update(ProjectTag::new("pyta")));
        assert_eq!(sources[2].sort_by, SortBy::Week);
        assert_eq!(config.project_name(&ProjectTag::new("pyta")), "PythonTA");
        assert_eq!(config.gallery[0].kind, MediaKind::Video);
        assert_eq!(config.github.fallback.top_language, "Rust");
        assert_eq!(
            config.absolute("/?post=a").as_deref(),
            Some("https://jane.dev/?post=a")
        );
    }

    #[test]
    fn rejects_duplicate_projects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        fs::write(
            &path,
            "[[updates]]\nid = \"a\"\nname = \"A\"\ndirectory = \"a\"\n\
             [[updates]]\nid = \"a\"\nname = \"B\"\ndirectory = \"b\"\n",
        )
        .unwrap();
        assert!(matches!(
            SiteConfig::load(&path),
            Err(ConfigError::DuplicateProject(id)) if id == "a"
        ));
    }
}
