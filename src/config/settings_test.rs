// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use crate::config::settings::{CacheBackend, Settings, DEFAULT_COMPANIES};
    use std::time::Duration;

    #[test]
    fn test_builtin_defaults() {
        let settings = Settings::default_settings().expect("defaults should deserialize");

        assert_eq!(settings.cache.ttl_hours, 6);
        assert_eq!(settings.cache.ttl(), Duration::from_secs(6 * 3600));
        assert_eq!(settings.cache.backend, CacheBackend::File);
        assert_eq!(settings.search.max_companies, 5);
        assert!((settings.matching.word_overlap_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(settings.search.default_companies.len(), DEFAULT_COMPANIES.len());
        assert!(settings.scraper.chromium_remote_url.is_none());
        assert!(settings.catalog.extra_file.is_none());
        assert!(settings.storage.jobs_file.is_none());
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_default_company_set_is_curated_size() {
        assert!((8..=10).contains(&DEFAULT_COMPANIES.len()));
    }
}
