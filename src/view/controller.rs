use crate::{
    content::{ContentRecord, Library, RecordKey},
    view::{location, History, MemoryHistory, Section, ViewState},
};
use tracing::debug;

/// What the main pane renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Listing(Section),
    Detail(&'a ContentRecord),
}

/// Owns the [`ViewState`] of one page session and keeps it in step with the
/// location held by `H`.
///
/// Requires a loaded [`Library`], so the initial location is never resolved
/// against a partially loaded collection.
pub struct PageController<'a, H: History = MemoryHistory> {
    library: &'a Library,
    history: H,
    state: ViewState,
}

impl<'a, H: History> PageController<'a, H> {
    /// Starts in `Detail` if the current location selects a known record,
    /// otherwise in `Listing` of the default section.
    pub fn new(library: &'a Library, history: H) -> Self {
        let mut controller = Self {
            library,
            history,
            state: ViewState::default(),
        };
        controller.location_changed();
        controller
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn view(&self) -> View<'a> {
        match self.state.selected.as_ref().and_then(|key| self.library.find(key)) {
            Some(record) => View::Detail(record),
            None => View::Listing(self.state.active_section),
        }
    }

    pub fn location(&self) -> &str {
        self.history.current()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Shows `record` and pushes its location. Returns whether anything
    /// changed; reselecting the current record is a no-op.
    pub fn select(&mut self, record: &ContentRecord) -> bool {
        let key = record.key();
        if self.state.selected.as_ref() == Some(&key) {
            return false;
        }
        if self.library.find(&key).is_none() {
            debug!("ignoring selection of unknown record {key:?}");
            return false;
        }
        self.history.push(location::encode(Some(&key)));
        self.state.selected = Some(key);
        true
    }

    /// Returns to the listing of the remembered section.
    pub fn close(&mut self) -> bool {
        if self.state.selected.take().is_none() {
            return false;
        }
        self.history.push(location::encode(None));
        true
    }

    /// Sections are not linkable, so the location is left alone. While a
    /// record is shown, this only changes where [`Self::close`] returns to.
    pub fn change_section(&mut self, section: Section) {
        self.state.active_section = section;
    }

    /// Re-derives state after the location changed behind our back (edited
    /// address, back/forward). An unresolvable selection resets to the
    /// default listing.
    pub fn location_changed(&mut self) {
        match location::decode(self.history.current()) {
            Some(key) if self.library.find(&key).is_some() => {
                self.state.selected = Some(key);
            }
            Some(key) => {
                debug!("location selects unknown record {key:?}");
                self.state = ViewState::default();
            }
            None => {
                self.state.selected = None;
            }
        }
    }

    pub fn key(&self) -> Option<&RecordKey> {
        self.state.selected.as_ref()
    }
}

impl<'a> PageController<'a, MemoryHistory> {
    pub fn back(&mut self) -> bool {
        let moved = self.history.back();
        if moved {
            self.location_changed();
        }
        moved
    }

    pub fn forward(&mut self) -> bool {
        let moved = self.history.forward();
        if moved {
            self.location_changed();
        }
        moved
    }

    /// The user typed or pasted `location`.
    pub fn navigate(&mut self, location: impl Into<String>) {
        self.history.push(location.into());
        self.location_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Category, ContentSource, ProjectTag, SortBy};
    use std::fs;
    use tempfile::TempDir;

    fn library() -> (TempDir, Library) {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        let updates = dir.path().join("updates");
        fs::create_dir(&posts).unwrap();
        fs::create_dir(&updates).unwrap();
        fs::write(posts.join("my-post.md"), "# My Post\nHello.").unwrap();
        fs::write(posts.join("other.md"), "# Other\nWorld.").unwrap();
        fs::write(updates.join("week1.md"), "# Week one\nStarted.").unwrap();
        let library = Library::load(vec![
            ContentSource::new(&posts, Category::Writing, SortBy::Date),
            ContentSource::new(
                &updates,
                Category::Update(ProjectTag::new("markus")),
                SortBy::Week,
            ),
        ])
        .unwrap();
        (dir, library)
    }

    fn post<'a>(library: &'a Library, slug: &str) -> &'a ContentRecord {
        library.find(&RecordKey::post(slug)).unwrap()
    }

    #[test]
    fn restores_known_selection_on_load() {
        let (_dir, library) = library();
        let controller = PageController::new(&library, MemoryHistory::new("/?post=my-post"));
        assert_eq!(controller.view(), View::Detail(post(&library, "my-post")));
    }

    #[test]
    fn unknown_selection_on_load_lists_default_section() {
        let (_dir, library) = library();
        let controller = PageController::new(&library, MemoryHistory::new("/?post=ghost-post"));
        assert_eq!(controller.view(), View::Listing(Section::default()));
        assert_eq!(controller.state(), &ViewState::default());
    }

    #[test]
    fn select_is_idempotent() {
        let (_dir, library) = library();
        let mut controller = PageController::new(&library, MemoryHistory::default());
        let record = post(&library, "other");

        assert!(controller.select(record));
        let state = controller.state().clone();
        let entries = controller.history().len();

        assert!(!controller.select(record));
        assert_eq!(controller.state(), &state);
        assert_eq!(controller.history().len(), entries);
        assert_eq!(controller.location(), "/?post=other");
    }

    #[test]
    fn close_returns_to_remembered_section() {
        let (_dir, library) = library();
        let mut controller = PageController::new(&library, MemoryHistory::default());
        controller.change_section(Section::Writing);
        assert_eq!(controller.location(), "/");

        controller.select(post(&library, "my-post"));
        assert_eq!(controller.location(), "/?post=my-post");
        controller.change_section(Section::Gallery);
        assert!(matches!(controller.view(), View::Detail(_)));

        assert!(controller.close());
        assert_eq!(controller.view(), View::Listing(Section::Gallery));
        assert_eq!(controller.location(), "/");
        assert!(!controller.close());
    }

    #[test]
    fn back_and_forward_resync() {
        let (_dir, library) = library();
        let mut controller = PageController::new(&library, MemoryHistory::default());
        controller.select(post(&library, "my-post"));
        controller.select(post(&library, "other"));

        assert!(controller.back());
        assert_eq!(controller.view(), View::Detail(post(&library, "my-post")));
        assert!(controller.back());
        assert_eq!(controller.view(), View::Listing(Section::About));
        assert!(!controller.back());
        assert!(controller.forward());
        assert_eq!(controller.key(), Some(&RecordKey::post("my-post")));
    }

    #[test]
    fn edited_location_falls_back_to_default() {
        let (_dir, library) = library();
        let mut controller = PageController::new(&library, MemoryHistory::default());
        controller.change_section(Section::Tech);

        controller.navigate("/?update=markus/week1");
        let update = library.updates.first().unwrap();
        assert_eq!(controller.view(), View::Detail(update));

        controller.navigate("/?update=pyta/week1");
        assert_eq!(controller.view(), View::Listing(Section::About));
    }

    #[test]
    fn unknown_record_is_not_selectable() {
        let (_dir, library) = library();
        let mut controller = PageController::new(&library, MemoryHistory::default());
        let mut stranger = post(&library, "other").clone();
        stranger.slug = "stranger".to_owned();
        assert!(!controller.select(&stranger));
        assert_eq!(controller.history().len(), 1);
    }
}
