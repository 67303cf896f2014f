use crate::content::{Category, ContentError, ContentRecord, ContentSource, ProjectTag, RecordKey};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::info;

/// Everything published, as of one load cycle. Immutable once loaded; reload
/// by loading again.
#[derive(Debug)]
pub struct Library {
    pub posts: Vec<ContentRecord>,
    /// Grouped by source in configuration order, each group sorted by week.
    pub updates: Vec<ContentRecord>,
    sources: Vec<ContentSource>,
}

impl Library {
    pub fn load(sources: Vec<ContentSource>) -> Result<Self, ContentError> {
        let listings = sources
            .par_iter()
            .map(|source| source.list_records())
            .collect::<Result<Vec<_>, _>>()?;

        let mut posts = Vec::new();
        let mut updates = Vec::new();
        for (source, records) in sources.iter().zip(listings) {
            info!(
                "loaded {} records from {}",
                records.len(),
                source.directory().display()
            );
            match source.category {
                Category::Writing => posts.extend(records),
                Category::Update(_) => updates.extend(records),
            }
        }

        Ok(Self {
            posts,
            updates,
            sources,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = &ContentRecord> + '_ {
        self.posts.iter().chain(&self.updates)
    }

    pub fn updates_for<'a>(
        &'a self,
        project: &'a ProjectTag,
    ) -> impl Iterator<Item = &'a ContentRecord> + 'a {
        self.updates
            .iter()
            .filter(move |u| u.category.project() == Some(project))
    }

    /// Listing entry for `key`, without body.
    pub fn find(&self, key: &RecordKey) -> Option<&ContentRecord> {
        let records = match &key.category {
            Category::Writing => &self.posts,
            Category::Update(_) => &self.updates,
        };
        records
            .iter()
            .find(|r| r.category == key.category && r.slug == key.slug)
    }

    /// Full record for `key`, re-read from disk with its body rendered.
    pub fn get(&self, key: &RecordKey) -> Result<Option<ContentRecord>, ContentError> {
        for source in self.sources.iter().filter(|s| s.category == key.category) {
            if let Some(record) = source.get_record_by_slug(&key.slug)? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.updates.is_empty()
    }
}
