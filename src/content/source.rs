use crate::content::{
    extract_summary, first_heading, group_label, parse_document, render_markdown, slugify,
    sort_records, Category, ContentError, ContentRecord, SortBy,
};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use wax::Glob;

/// One directory of markdown files, all of the same category.
#[derive(Debug, Clone)]
pub struct ContentSource {
    pub directory: PathBuf,
    pub category: Category,
    pub sort_by: SortBy,
}

struct ContentFile {
    name: String,
    path: PathBuf,
    slug: String,
}

impl ContentSource {
    pub fn new(directory: impl Into<PathBuf>, category: Category, sort_by: SortBy) -> Self {
        Self {
            directory: directory.into(),
            category,
            sort_by,
        }
    }

    /// Every published record, without bodies, in display order.
    ///
    /// A missing directory means nothing is published yet and yields an empty
    /// list. Empty files are drafts and are skipped, as are files that cannot
    /// be read.
    pub fn list_records(&self) -> Result<Vec<ContentRecord>, ContentError> {
        let mut records = Vec::new();
        for file in self.files()? {
            match fs::read_to_string(&file.path) {
                Ok(text) => {
                    records.push(self.record(&file, &text, false)?);
                }
                Err(e) => {
                    warn!("skipping unreadable {}: {e}", file.path.display());
                }
            }
        }
        sort_records(self.sort_by, &mut records);
        Ok(records)
    }

    /// The record whose derived slug is `slug`, with its body rendered.
    pub fn get_record_by_slug(&self, slug: &str) -> Result<Option<ContentRecord>, ContentError> {
        let file = if let Some(file) = self.files()?.into_iter().find(|f| f.slug == slug) {
            file
        } else {
            return Ok(None);
        };
        let text = fs::read_to_string(&file.path).map_err(|source| ContentError::Io {
            path: file.path.clone(),
            source,
        })?;
        self.record(&file, &text, true).map(Some)
    }

    /// Published files sorted by file name, so that when two names collapse to
    /// the same slug the same file wins in listings and lookups. Drafts never
    /// claim a slug.
    fn files(&self) -> Result<Vec<ContentFile>, ContentError> {
        let exists = self
            .directory
            .try_exists()
            .map_err(|source| ContentError::Io {
                path: self.directory.clone(),
                source,
            })?;
        if !exists {
            warn!(
                "content directory not found: {}",
                self.directory.display()
            );
            return Ok(Vec::new());
        }

        let glob = Glob::new("*.md").map_err(|e| ContentError::Walk {
            directory: self.directory.clone(),
            message: e.to_string(),
        })?;
        let mut files = Vec::new();
        for entry in glob.walk(&self.directory) {
            let entry = entry.map_err(|e| ContentError::Walk {
                directory: self.directory.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if fs::metadata(entry.path()).is_ok_and(|metadata| metadata.len() == 0) {
                debug!("skipping draft {}", entry.path().display());
                continue;
            }
            let name = entry.matched().complete().to_owned();
            files.push(ContentFile {
                slug: slugify(&name),
                path: entry.path().to_owned(),
                name,
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));

        let mut slugs = HashSet::new();
        files.retain(|file| {
            let unique = slugs.insert(file.slug.clone());
            if !unique {
                warn!(
                    "ignoring {} because its slug {} is already taken",
                    file.path.display(),
                    file.slug
                );
            }
            unique
        });
        Ok(files)
    }

    fn record(
        &self,
        file: &ContentFile,
        text: &str,
        with_body: bool,
    ) -> Result<ContentRecord, ContentError> {
        let (front_matter, body) = parse_document(text, &file.name);
        let title = front_matter
            .title
            .or_else(|| first_heading(body))
            .unwrap_or_else(|| file_stem(&file.name).to_owned());
        Ok(ContentRecord {
            group_label: group_label(&file.name, &title),
            summary: front_matter
                .description
                .unwrap_or_else(|| extract_summary(body)),
            date: front_matter.date.unwrap_or_default(),
            image: front_matter.image,
            body: if with_body {
                Some(render_markdown(body)?)
            } else {
                None
            },
            slug: file.slug.clone(),
            category: self.category.clone(),
            title,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

fn file_stem(name: &str) -> &str {
    name.strip_suffix(".md").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ProjectTag;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::write(dir.join(name), text).unwrap();
    }

    fn posts(dir: &Path) -> ContentSource {
        ContentSource::new(dir, Category::Writing, SortBy::Date)
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = posts(&dir.path().join("nope"));
        assert_eq!(source.list_records().unwrap(), Vec::new());
        assert_eq!(source.get_record_by_slug("anything").unwrap(), None);
    }

    #[test]
    fn derives_metadata_and_puts_dated_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "# Hello\nWorld intro text.");
        write(dir.path(), "b.md", "---\ndate: 2024-01-01\n---\n# B\nbody");

        let records = posts(dir.path()).list_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].slug, "b");
        assert_eq!(records[0].date, "2024-01-01");

        let a = &records[1];
        assert_eq!(a.slug, "a");
        assert_eq!(a.title, "Hello");
        assert_eq!(a.summary, "World intro text.");
        assert_eq!(a.date, "");
        assert_eq!(a.body, None);
    }

    #[test]
    fn newest_first() {
        let dir = tempfile::tempdir().unwrap();
        for (name, date) in [
            ("old.md", "2021-03-04"),
            ("new.md", "2024-11-30"),
            ("mid.md", "2023-06-15"),
            ("undated.md", ""),
        ] {
            write(dir.path(), name, &format!("---\ndate: '{date}'\n---\n# {name}\n"));
        }

        let records = posts(dir.path()).list_records().unwrap();
        let slugs = records.iter().map(|r| r.slug.as_str()).collect::<Vec<_>>();
        assert_eq!(slugs, ["new", "mid", "old", "undated"]);
        assert!(records
            .windows(2)
            .filter(|w| !w[1].date.is_empty())
            .all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn skips_drafts_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "draft.md", "");
        write(dir.path(), "notes.txt", "# Not markdown");
        write(dir.path(), "real.md", "# Real");
        fs::create_dir(dir.path().join("nested.md")).unwrap();

        let records = posts(dir.path()).list_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].slug, "real");
        assert_eq!(posts(dir.path()).get_record_by_slug("draft").unwrap(), None);
    }

    #[test]
    fn slugs_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "My Post.md", "# First");
        write(dir.path(), "my post.md", "# Second");
        write(dir.path(), "my-post.md", "# Third");
        write(dir.path(), "Other.md", "# Other");

        let records = posts(dir.path()).list_records().unwrap();
        let slugs = records.iter().map(|r| r.slug.clone()).collect::<HashSet<_>>();
        assert_eq!(slugs.len(), records.len());
        assert_eq!(records.len(), 2);

        let found = posts(dir.path()).get_record_by_slug("my-post").unwrap().unwrap();
        assert_eq!(found.title, "First");
    }

    #[test]
    fn drafts_do_not_claim_slugs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "My Post.md", "");
        write(dir.path(), "my-post.md", "# Published\nReal text.");

        let records = posts(dir.path()).list_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Published");

        let found = posts(dir.path()).get_record_by_slug("my-post").unwrap().unwrap();
        assert!(found.body.unwrap().contains("Real text."));
    }

    #[test]
    fn front_matter_overrides_derived_values() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Intro Post.md",
            "---\ntitle: Custom\ndescription: Explicit.\nimage: /cover.jpg\n---\n# Derived\nDerived summary.",
        );

        let records = posts(dir.path()).list_records().unwrap();
        let record = &records[0];
        assert_eq!(record.slug, "intro-post");
        assert_eq!(record.title, "Custom");
        assert_eq!(record.summary, "Explicit.");
        assert_eq!(record.image.as_deref(), Some("/cover.jpg"));
    }

    #[test]
    fn title_falls_back_to_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Loose Thoughts.md", "no heading at all");
        let records = posts(dir.path()).list_records().unwrap();
        assert_eq!(records[0].title, "Loose Thoughts");
        assert_eq!(records[0].group_label, "Loose Thoughts");
    }

    #[test]
    fn lookup_renders_body() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Deep Dive.md",
            "---\ndate: 2024-02-02\n---\n# Deep Dive\n\n<figure>raw</figure>\n\n~~old~~ new\n",
        );

        let source = posts(dir.path());
        let record = source.get_record_by_slug("deep-dive").unwrap().unwrap();
        let body = record.body.unwrap();
        assert!(body.contains("<figure>raw</figure>"), "{body}");
        assert!(body.contains("<del>old</del>"), "{body}");
        assert_eq!(record.date, "2024-02-02");

        assert_eq!(source.get_record_by_slug("hello").unwrap(), None);
    }

    #[test]
    fn updates_sort_by_week() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "week2.md", "# Progress\nTwo.");
        write(dir.path(), "Week 10.md", "# Progress\nTen.");
        write(dir.path(), "kickoff.md", "# Kickoff\nNo number.");
        write(dir.path(), "notes.md", "# Week 7 notes\nSeven.");

        let project = ProjectTag::new("markus");
        let source = ContentSource::new(dir.path(), Category::Update(project.clone()), SortBy::Week);
        let records = source.list_records().unwrap();
        let labels = records.iter().map(|r| r.group_label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, ["Week 10", "Week 7", "Week 2", "kickoff"]);
        assert!(records
            .iter()
            .all(|r| r.category == Category::Update(project.clone())));
        assert_eq!(records[0].slug, "week-10");
    }
}
