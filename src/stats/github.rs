use crate::stats::{StatsError, VanityStats};
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use tokio::runtime::Builder;
use tracing::{debug, warn};

const API: &str = "https://api.github.com";

const CONTRIBUTIONS_QUERY: &str = "query($login: String!) { user(login: $login) { \
    contributionsCollection { contributionCalendar { totalContributions } } } }";

#[derive(Debug, Deserialize)]
pub struct User {
    pub public_repos: u64,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub stargazers_count: u64,
    pub language: Option<String>,
    /// RFC 3339.
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
}

#[derive(Deserialize)]
struct GraphQlData {
    user: Option<GraphQlUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlUser {
    contributions_collection: ContributionsCollection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionCalendar {
    total_contributions: u64,
}

pub struct GithubClient {
    http: reqwest::Client,
    username: String,
    token: Option<String>,
}

impl GithubClient {
    /// `timeout` bounds each request separately.
    pub fn new(
        username: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StatsError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            username: username.into(),
            token,
        })
    }

    pub async fn user(&self) -> Result<User, StatsError> {
        self.send(self.http.get(format!("{API}/users/{}", self.username)))
            .await
    }

    pub async fn repositories(&self) -> Result<Vec<Repository>, StatsError> {
        self.send(self.http.get(format!(
            "{API}/users/{}/repos?per_page=100&type=public",
            self.username
        )))
        .await
    }

    /// Requires a token.
    pub async fn contributions(&self) -> Result<u64, StatsError> {
        let token = self.token.as_ref().ok_or(StatsError::NoToken)?;
        let response = self
            .send::<GraphQlResponse>(
                self.http
                    .post(format!("{API}/graphql"))
                    .bearer_auth(token)
                    .json(&serde_json::json!({
                        "query": CONTRIBUTIONS_QUERY,
                        "variables": { "login": self.username },
                    })),
            )
            .await?;
        response
            .data
            .and_then(|data| data.user)
            .map(|user| {
                user.contributions_collection
                    .contribution_calendar
                    .total_contributions
            })
            .ok_or_else(|| StatsError::Malformed("missing contribution calendar".to_owned()))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StatsError> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StatsError::RateLimited);
        }
        if !status.is_success() {
            return Err(StatsError::Status(status));
        }
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                StatsError::Malformed(e.to_string())
            } else {
                StatsError::Http(e)
            }
        })
    }

    /// One attempt at each endpoint, concurrently. Each piece that fails is
    /// taken from `fallback`.
    pub async fn fetch(&self, fallback: &VanityStats) -> VanityStats {
        let (user, repositories, contributions) = futures::join!(
            self.user(),
            self.repositories(),
            self.contributions()
        );
        summarize(user, repositories, contributions, Utc::now(), fallback)
    }

    pub fn fetch_blocking(&self, fallback: &VanityStats) -> VanityStats {
        let rt = match Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!("using fallback GitHub stats: {}", StatsError::Runtime(e));
                return fallback.clone();
            }
        };
        rt.block_on(self.fetch(fallback))
    }
}

pub fn summarize(
    user: Result<User, StatsError>,
    repositories: Result<Vec<Repository>, StatsError>,
    contributions: Result<u64, StatsError>,
    now: DateTime<Utc>,
    fallback: &VanityStats,
) -> VanityStats {
    let user = user
        .inspect_err(|e| warn!("GitHub profile unavailable: {e}"))
        .ok();
    let repositories = repositories
        .inspect_err(|e| warn!("GitHub repositories unavailable: {e}"))
        .ok();
    let contributions = match contributions {
        Ok(total) => Some(total),
        Err(StatsError::NoToken) => {
            debug!("estimating contributions without a GitHub token");
            None
        }
        Err(e) => {
            warn!("GitHub contributions unavailable: {e}");
            None
        }
    }
    .or_else(|| {
        repositories
            .as_deref()
            .map(|r| estimate_contributions(r, now))
    });

    VanityStats {
        contributions: contributions.unwrap_or(fallback.contributions),
        stars: repositories
            .as_deref()
            .map(|r| r.iter().map(|r| r.stargazers_count).sum())
            .unwrap_or(fallback.stars),
        repositories: user
            .map(|u| u.public_repos)
            .unwrap_or(fallback.repositories),
        top_language: repositories
            .as_deref()
            .and_then(top_language)
            .unwrap_or_else(|| fallback.top_language.clone()),
    }
}

/// Ten per repository touched within the last year.
fn estimate_contributions(repositories: &[Repository], now: DateTime<Utc>) -> u64 {
    let year_ago = now - TimeDelta::days(365);
    let recent = repositories
        .iter()
        .filter_map(|r| r.updated_at.as_deref())
        .filter_map(|d| DateTime::parse_from_rfc3339(d).ok())
        .filter(|d| d.with_timezone(&Utc) >= year_ago)
        .count();
    recent as u64 * 10
}

/// Most common language; the first seen wins ties.
fn top_language(repositories: &[Repository]) -> Option<String> {
    let mut counts = Vec::<(&str, usize)>::new();
    for language in repositories.iter().filter_map(|r| r.language.as_deref()) {
        if let Some((_, count)) = counts.iter_mut().find(|(l, _)| *l == language) {
            *count += 1;
        } else {
            counts.push((language, 1));
        }
    }
    counts
        .into_iter()
        .fold(None::<(&str, usize)>, |best, (language, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((language, count)),
        })
        .map(|(language, _)| language.to_owned())
}
