use crate::content::RecordKey;

/// Listing sections, in navigation order. The first is the default.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    #[default]
    About,
    Projects,
    Writing,
    Updates,
    Tech,
    Gallery,
    Resume,
}

impl Section {
    pub const ALL: [Self; 7] = [
        Self::About,
        Self::Projects,
        Self::Writing,
        Self::Updates,
        Self::Tech,
        Self::Gallery,
        Self::Resume,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::About => "about",
            Self::Projects => "projects",
            Self::Writing => "writing",
            Self::Updates => "updates",
            Self::Tech => "tech",
            Self::Gallery => "gallery",
            Self::Resume => "resume",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::About => "About",
            Self::Projects => "Projects",
            Self::Writing => "Writing",
            Self::Updates => "Work Updates",
            Self::Tech => "Tech Stack",
            Self::Gallery => "Gallery",
            Self::Resume => "Resume",
        }
    }
}

/// What the main pane shows. A selection takes precedence over the section.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub selected: Option<RecordKey>,
    /// Remembered while a selection is shown, so closing returns to it.
    pub active_section: Section,
}
