//! On-disk cache of fitted growth exponents, keyed by n.
//!
//! One mode writes it, a later mode reads it. There is no locking and no
//! versioning; the file is plain pretty-printed JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dirichlet::{growth_exponent, ArithmeticFunction, ExponentFit};
use crate::error::{ExperimentError, Result};
use crate::report::write_text;

pub const DEFAULT_CACHE_PATH: &str = "cache/optimal_exponents.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExponentCache {
    pub entries: BTreeMap<u64, Vec<ExponentFit>>,
}

impl ExponentCache {
    /// Load an existing cache. A missing file is [`ExperimentError::MissingInput`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ExperimentError::MissingInput(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let cache: ExponentCache = serde_json::from_str(&contents)?;
        log::info!("Loaded {} cached n values from {}", cache.entries.len(), path.display());
        Ok(cache)
    }

    /// Load if present and readable, otherwise start empty.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(cache) => cache,
            Err(e) => {
                log::warn!("Failed to read {}: {}, starting fresh", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_text(path, &serde_json::to_string_pretty(self)?)?;
        log::info!("Saved {} n values to {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn get(&self, n: u64) -> Option<&[ExponentFit]> {
        self.entries.get(&n).map(Vec::as_slice)
    }

    /// Fit every function at n unless n is already cached. Returns true if
    /// new fits were computed.
    pub fn fill(&mut self, n: u64, functions: &[ArithmeticFunction]) -> bool {
        if self.entries.contains_key(&n) {
            log::debug!("n = {} already cached", n);
            return false;
        }
        let fits: Vec<ExponentFit> = functions
            .iter()
            .filter_map(|&f| growth_exponent(f, n))
            .collect();
        self.entries.insert(n, fits);
        true
    }
}

pub fn print_exponent_cache(cache: &ExponentCache) {
    println!(
        "  {:>10} {:<6} {:>10} {:>10} {:>7}",
        "n", "f", "exponent", "R^2", "points"
    );
    for (n, fits) in &cache.entries {
        for fit in fits {
            println!(
                "  {:>10} {:<6} {:>10.5} {:>10.6} {:>7}",
                n,
                fit.function.to_string(),
                fit.exponent,
                fit.r_squared,
                fit.points
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        match ExponentCache::load(&path) {
            Err(ExperimentError::MissingInput(p)) => assert_eq!(p, path),
            other => panic!("expected MissingInput, got {:?}", other),
        }
        assert_eq!(ExponentCache::load_or_default(&path), ExponentCache::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("optimal_exponents.json");

        let mut cache = ExponentCache::default();
        assert!(cache.fill(1_000, &ArithmeticFunction::ALL));
        assert!(!cache.fill(1_000, &ArithmeticFunction::ALL));
        assert!(cache.fill(2_000, &[ArithmeticFunction::One]));
        cache.save(&path).unwrap();

        let loaded = ExponentCache::load(&path).unwrap();
        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(loaded.get(2_000).unwrap().len(), 1);
        assert_eq!(
            loaded.get(1_000).unwrap()[0].function,
            cache.get(1_000).unwrap()[0].function
        );
        assert!(loaded.get(3_000).is_none());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ExponentCache::load(&path), Err(ExperimentError::Json(_))));
        assert!(ExponentCache::load_or_default(&path).entries.is_empty());
    }
}
