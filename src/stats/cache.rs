use crate::stats::VanityStats;
use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};
use tracing::info;

/// Last fetched stats, refreshed at most once per `ttl`. Readers never wait on
/// a fetch: until the first one lands they get the fallback.
#[derive(Debug)]
pub struct StatsCache {
    ttl: Duration,
    fallback: VanityStats,
    entry: Mutex<Option<(Instant, VanityStats)>>,
}

impl StatsCache {
    pub fn new(ttl: Duration, fallback: VanityStats) -> Self {
        Self {
            ttl,
            fallback,
            entry: Mutex::new(None),
        }
    }

    pub fn current(&self) -> VanityStats {
        self.lock()
            .as_ref()
            .map(|(_, stats)| stats.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn is_stale(&self) -> bool {
        self.lock()
            .as_ref()
            .map_or(true, |(fetched, _)| fetched.elapsed() >= self.ttl)
    }

    pub fn store(&self, stats: VanityStats) {
        *self.lock() = Some((Instant::now(), stats));
    }

    /// Runs `fetch` (without holding the lock) if the entry is stale.
    pub fn refresh(&self, fetch: impl FnOnce(&VanityStats) -> VanityStats) -> bool {
        if !self.is_stale() {
            return false;
        }
        let stats = fetch(&self.fallback);
        info!(
            "GitHub stats: {} contributions, {} stars, {} repositories, mostly {}",
            stats.contributions, stats.stars, stats.repositories, stats.top_language
        );
        self.store(stats);
        true
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<(Instant, VanityStats)>> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live() -> VanityStats {
        VanityStats {
            contributions: 1,
            stars: 2,
            repositories: 3,
            top_language: "Rust".to_owned(),
        }
    }

    #[test]
    fn fallback_until_first_fetch() {
        let cache = StatsCache::new(Duration::from_secs(60), VanityStats::default());
        assert!(cache.is_stale());
        assert_eq!(cache.current(), VanityStats::default());

        assert!(cache.refresh(|_| live()));
        assert_eq!(cache.current(), live());
        assert!(!cache.is_stale());
        assert!(!cache.refresh(|_| panic!("fresh entries are not refetched")));
    }

    #[test]
    fn zero_ttl_always_refreshes() {
        let cache = StatsCache::new(Duration::ZERO, VanityStats::default());
        cache.store(live());
        assert!(cache.is_stale());
        assert!(cache.refresh(|fallback| fallback.clone()));
        assert_eq!(cache.current(), VanityStats::default());
    }
}
