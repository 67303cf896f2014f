use crate::{
    config::SiteConfig,
    output::DynLazy,
    util::{checksum, progress_bar, recursively_remove_empty_dirs_of_contents},
};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};
use tracing::{debug, info};
use wax::Glob;

/// Extended attribute holding the checksum of what was last written.
const HASH_ATTRIBUTE: &str = "foliohash";

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("couldn't write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("couldn't scan {}: {message}", .directory.display())]
    Walk { directory: PathBuf, message: String },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> BuildError + '_ {
    move |source| BuildError::Io {
        path: path.to_owned(),
        source,
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub written: usize,
    pub unchanged: usize,
    pub removed: usize,
}

pub fn build(
    start: Instant,
    config: &SiteConfig,
    output: &HashMap<String, DynLazy<'_, Vec<u8>>>,
) -> Result<BuildSummary, BuildError> {
    let output_dir = config.output_dir();
    let progress = progress_bar("Saving website...", output.len(), start);

    let removed = remove_obsolete(&output_dir, output)?;

    let written = AtomicUsize::new(0);
    let unchanged = AtomicUsize::new(0);

    output.par_iter().try_for_each(|(public, generator)| {
        let path = config.subdirectory(public);
        let contents = &**generator;
        let new_hash = checksum(contents);

        let reuse = path.is_file()
            && matches!(
                fsquirrel::get(&path, HASH_ATTRIBUTE),
                Ok(Some(old_hash)) if old_hash == new_hash.as_bytes()
            );

        if reuse {
            unchanged.fetch_add(1, Ordering::Relaxed);
        } else {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(io_error(dir))?;
            }
            let _ = fsquirrel::remove(&path, HASH_ATTRIBUTE);
            fs::write(&path, contents).map_err(io_error(&path))?;
            if let Err(e) = fsquirrel::set(&path, HASH_ATTRIBUTE, new_hash.as_bytes()) {
                debug!("couldn't record checksum of {}: {e}", path.display());
            }
            written.fetch_add(1, Ordering::Relaxed);
        }

        progress.inc(1);
        Ok::<_, BuildError>(())
    })?;

    progress.finish_and_clear();

    let summary = BuildSummary {
        written: written.into_inner(),
        unchanged: unchanged.into_inner(),
        removed,
    };
    info!(
        "({:.1}s) Saved website to {}, {} written, {} unchanged, removed {} obsolete files",
        start.elapsed().as_secs_f32(),
        output_dir.display(),
        summary.written,
        summary.unchanged,
        summary.removed,
    );
    Ok(summary)
}

fn remove_obsolete(
    output_dir: &Path,
    output: &HashMap<String, DynLazy<'_, Vec<u8>>>,
) -> Result<usize, BuildError> {
    if !output_dir.is_dir() {
        return Ok(0);
    }
    let walk_error = |message: String| BuildError::Walk {
        directory: output_dir.to_owned(),
        message,
    };

    let mut removals = 0usize;
    let glob = Glob::new("**").map_err(|e| walk_error(e.to_string()))?;
    for file in glob.walk(output_dir) {
        let file = file.map_err(|e| walk_error(e.to_string()))?;
        if !file.file_type().is_file() {
            continue;
        }
        let public = format!("/{}", file.matched().complete());
        if !output.contains_key(&public) {
            debug!("removing obsolete {public}");
            fs::remove_file(file.path()).map_err(io_error(file.path()))?;
            removals += 1;
        }
    }
    recursively_remove_empty_dirs_of_contents(output_dir).map_err(io_error(output_dir))?;
    Ok(removals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{tests::fixture, Site};

    #[test]
    fn writes_output_and_removes_obsolete_files() {
        let (dir, config, library, stats) = fixture(
            "[[updates]]\nid = \"markus\"\nname = \"MarkUs\"\ndirectory = \"markus\"\n",
        );
        let site = Site {
            config: &config,
            library: &library,
            stats: &stats,
        };
        let output = site.output();

        let stale = dir.path().join("output/old/page.html");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "stale").unwrap();

        let summary = build(Instant::now(), &config, &output).unwrap();
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.written + summary.unchanged, output.len());
        assert!(!stale.exists());
        assert!(!dir.path().join("output/old").exists());

        let index = fs::read_to_string(dir.path().join("output/index.html")).unwrap();
        assert!(index.starts_with("<!DOCTYPE html>"));
        assert!(dir.path().join("output/index.html?post=hello-world").is_file());
        assert!(dir.path().join("output/api.json").is_file());
        let update = dir.path().join("output/index.html?update=markus%2Fweek2");
        assert!(update.is_file());
        assert!(!dir.path().join("output/index.html?update=markus").exists());

        let again = build(Instant::now(), &config, &output).unwrap();
        assert_eq!(again.removed, 0);
        assert_eq!(again.written + again.unchanged, output.len());
    }
}
