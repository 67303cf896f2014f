//! Markdown content ingestion: directories of `.md` files with optional YAML
//! front matter become ordered [`ContentRecord`]s.

use std::{io, path::PathBuf};

mod category;
mod front_matter;
mod library;
mod order;
mod record;
mod rich_text;
mod source;
mod summary;

pub use category::*;
pub use front_matter::*;
pub use library::*;
pub use order::*;
pub use record::*;
pub use rich_text::*;
pub use source::*;
pub use summary::*;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to enumerate {}: {message}", .directory.display())]
    Walk { directory: PathBuf, message: String },
    #[error("failed to render markdown: {0}")]
    Markdown(String),
}
