use crate::{
    config::SiteConfig,
    content::{ContentRecord, Library},
    stats::StatsCache,
    view::{location, History, MemoryHistory, PageController, View},
};
use sitemap_rs::{
    url::{ChangeFrequency, Url},
    url_set::UrlSet,
};
use std::{collections::HashMap, sync::LazyLock};
use tracing::warn;
use yew::html;

mod api;
mod app;
mod build;
mod rich_text;
mod sections;
mod serve;
mod structured_data;

pub use api::*;
pub use app::*;
pub use build::*;
pub use rich_text::*;
pub use sections::*;
pub use serve::*;
pub use structured_data::*;

pub type DynLazy<'a, T> = LazyLock<T, Box<dyn FnOnce() -> T + Send + Sync + 'a>>;

/// Everything a page needs, borrowed for the lifetime of a build or server.
#[derive(Clone, Copy)]
pub struct Site<'a> {
    pub config: &'a SiteConfig,
    pub library: &'a Library,
    pub stats: &'a StatsCache,
}

impl<'a> Site<'a> {
    pub fn output(self) -> HashMap<String, DynLazy<'a, Vec<u8>>> {
        let mut ret = HashMap::<String, DynLazy<'a, Vec<u8>>>::new();
        fn ret_insert<'a>(
            ret: &mut HashMap<String, DynLazy<'a, Vec<u8>>>,
            path: String,
            file: DynLazy<'a, Vec<u8>>,
        ) {
            if ret.insert(path.clone(), file).is_some() {
                warn!("duplicate output {path}");
            }
        }

        ret_insert(
            &mut ret,
            "/index.html".to_owned(),
            LazyLock::new(Box::new(move || self.render_location(location::BASE))),
        );

        for record in self.library.records() {
            ret_insert(
                &mut ret,
                location::page_path(&record.key()),
                LazyLock::new(Box::new(move || {
                    let mut controller =
                        PageController::new(self.library, MemoryHistory::default());
                    controller.select(record);
                    self.render_page(&controller)
                })),
            );
        }

        ret_insert(
            &mut ret,
            "/api.json".to_owned(),
            LazyLock::new(Box::new(move || render_api(self))),
        );

        if let Some(sitemap) = self.sitemap() {
            ret_insert(
                &mut ret,
                "/sitemap.xml".to_owned(),
                LazyLock::new(Box::new(move || sitemap)),
            );
        }

        ret_insert(
            &mut ret,
            "/robots.txt".to_owned(),
            LazyLock::new(Box::new(move || {
                let mut robots_txt = String::from("User-agent: *\nAllow: /\n");
                if let Some(sitemap) = self.config.absolute("/sitemap.xml") {
                    robots_txt.push_str(&format!("Sitemap: {sitemap}\n"));
                }
                robots_txt.into_bytes()
            })),
        );

        ret
    }

    /// Page for an arbitrary location, restoring whatever it selects.
    pub fn render_location(self, location: &str) -> Vec<u8> {
        let controller = PageController::new(self.library, MemoryHistory::new(location));
        self.render_page(&controller)
    }

    pub fn render_page<H: History>(self, controller: &PageController<'_, H>) -> Vec<u8> {
        let stats = self.stats.current();
        let state = controller.state();
        let canonical = location::encode(controller.key());

        let (title, description, og_image, head, main) = match controller.view() {
            View::Detail(listed) => {
                let record = self.full_record(listed);
                (
                    format!("{} | {}", record.title, self.config.title),
                    Some(record.summary.clone()).filter(|s| !s.is_empty()),
                    record.image.clone(),
                    write_structured_data(record_structured_data(
                        self.config,
                        &record,
                        &canonical,
                    )),
                    render_detail(self.config, &record),
                )
            }
            View::Listing(section) => (
                self.config.title.clone(),
                self.config.description.clone(),
                self.config.profile.avatar.clone(),
                Default::default(),
                render_listing(self, section),
            ),
        };

        render_html(AppProps {
            config: self.config,
            canonical,
            title: title.into(),
            description: description.map(|d| d.into()),
            og_image,
            head,
            header: html! {<>
                {render_profile(self.config, &stats)}
                {render_nav(state.active_section)}
            </>},
            body: main,
        })
    }

    /// `listed` with its body, falling back to the summary if the file changed
    /// or vanished since the library was loaded.
    fn full_record(self, listed: &ContentRecord) -> ContentRecord {
        match self.library.get(&listed.key()) {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("{:?} disappeared since loading", listed.key());
                listed.clone()
            }
            Err(e) => {
                warn!("couldn't load {:?}: {e}", listed.key());
                listed.clone()
            }
        }
    }

    fn sitemap(self) -> Option<Vec<u8>> {
        let root = self.config.absolute(location::BASE)?;
        let urls = std::iter::once(root)
            .chain(self.library.records().filter_map(|record| {
                self.config
                    .absolute(&location::encode(Some(&record.key())))
            }))
            .filter_map(|url| {
                Url::builder(url)
                    .change_frequency(ChangeFrequency::Weekly)
                    .build()
                    .inspect_err(|e| warn!("skipping sitemap entry: {e:?}"))
                    .ok()
            })
            .collect::<Vec<_>>();

        let sitemap = UrlSet::new(urls)
            .inspect_err(|e| warn!("skipping sitemap: {e:?}"))
            .ok()?;
        let mut ret = Vec::<u8>::new();
        sitemap
            .write(&mut ret)
            .inspect_err(|e| warn!("skipping sitemap: {e:?}"))
            .ok()?;
        Some(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::VanityStats;
    use std::{fs, time::Duration};
    use tempfile::TempDir;

    pub(crate) fn fixture(config: &str) -> (TempDir, SiteConfig, Library, StatsCache) {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("blog-posts");
        let updates = dir.path().join("markus");
        fs::create_dir(&posts).unwrap();
        fs::create_dir(&updates).unwrap();
        fs::write(
            posts.join("hello world.md"),
            "---\ntitle: Hello <World>\ndate: 2024-03-01\n---\n# Ignored\nFirst post body.",
        )
        .unwrap();
        fs::write(posts.join("draft.md"), "").unwrap();
        fs::write(updates.join("week2.md"), "# Week 2\nShipped **it**.").unwrap();

        let path = dir.path().join("folio.toml");
        fs::write(&path, config).unwrap();
        let config = SiteConfig::load(&path).unwrap();
        let library = Library::load(config.content_sources()).unwrap();
        let stats = StatsCache::new(Duration::from_secs(60), VanityStats::default());
        (dir, config, library, stats)
    }

    const CONFIG: &str = r#"
        title = "Jane Doe"
        root_url = "https://jane.dev"

        [profile]
        name = "Jane Doe"

        [[updates]]
        id = "markus"
        name = "MarkUs"
        directory = "markus"
    "#;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn one_page_per_record() {
        let (_dir, config, library, stats) = fixture(CONFIG);
        let site = Site {
            config: &config,
            library: &library,
            stats: &stats,
        };
        let output = site.output();

        let mut paths = output.keys().cloned().collect::<Vec<_>>();
        paths.sort();
        assert_eq!(
            paths,
            [
                "/api.json",
                "/index.html",
                "/index.html?post=hello-world",
                "/index.html?update=markus%2Fweek2",
                "/robots.txt",
                "/sitemap.xml",
            ]
        );

        let post = text(&output["/index.html?post=hello-world"]);
        assert!(post.contains("First post body."));
        assert!(post.contains("Hello &lt;World&gt;"));
        assert!(post.contains("https://jane.dev/?post=hello-world"));

        let update = text(&output["/index.html?update=markus%2Fweek2"]);
        assert!(update.contains("<strong>it</strong>"));

        let robots = text(&output["/robots.txt"]);
        assert!(robots.contains("Sitemap: https://jane.dev/sitemap.xml"));

        let sitemap = text(&output["/sitemap.xml"]);
        assert!(sitemap.contains("https://jane.dev/?update=markus/week2"));
    }

    #[test]
    fn unknown_location_renders_listing() {
        let (_dir, config, library, stats) = fixture("");
        let site = Site {
            config: &config,
            library: &library,
            stats: &stats,
        };
        let page = text(&site.render_location("/?post=ghost"));
        assert!(page.contains("Hello &lt;World&gt;"));
        assert!(!page.contains("id=\"detail\""));
        assert!(!site.output().contains_key("/sitemap.xml"));
    }
}
