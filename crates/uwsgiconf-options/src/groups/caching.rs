//! Caches.

use uwsgiconf_core::{KeyValues, Section};

/// Cache subsystem parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachingParams {
    /// Disables item expiration.
    pub no_expire: Option<bool>,
    /// Seconds between expiration sweeps.
    pub expire_scan_interval: Option<u32>,
    /// Logs freed items.
    pub report_freed: Option<bool>,
}

/// A cache declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheParams {
    /// Maximum number of items.
    pub max_items: Option<u32>,
    /// Maximum key size.
    pub key_size: Option<u32>,
    /// Block size in bytes.
    pub block_size: Option<u32>,
    /// Number of blocks.
    pub blocks_number: Option<u32>,
    /// Hash algorithm.
    pub hash_algo: Option<String>,
    /// Hash table size.
    pub hash_size: Option<u32>,
    /// File persisting the cache.
    pub store: Option<String>,
    /// Seconds between store syncs.
    pub store_sync_interval: Option<u32>,
    /// Recreates the store when its layout changes.
    pub store_delete: Option<bool>,
    /// Uses a bitmap to allocate blocks.
    pub bitmap: Option<bool>,
    /// Disables expiration for this cache.
    pub no_expire: Option<bool>,
}

/// Caching option group.
#[derive(Debug)]
pub struct Caching<'a> {
    section: &'a mut Section,
}

impl<'a> Caching<'a> {
    pub(crate) fn new(section: &'a mut Section) -> Self {
        Self { section }
    }

    /// Sets cache subsystem parameters.
    pub fn set_basic_params(self, params: CachingParams) -> &'a mut Section {
        self.section
            .set("cache-no-expire", params.no_expire)
            .set("cache-expire-freq", params.expire_scan_interval)
            .set("cache-report-freed-items", params.report_freed)
    }

    /// Declares a named cache (`cache2`). Declaring a name twice is a no-op.
    pub fn add_cache(self, name: &str, params: CacheParams) -> &'a mut Section {
        if !self.section.mark_registered("cache", name) {
            return self.section;
        }
        let payload = KeyValues::new()
            .push("name", name)
            .push("items", params.max_items)
            .push("keysize", params.key_size)
            .push("blocksize", params.block_size)
            .push("blocks", params.blocks_number)
            .push("hash", params.hash_algo)
            .push("hashsize", params.hash_size)
            .push("store", params.store)
            .push("store_sync", params.store_sync_interval)
            .push("store_delete", params.store_delete)
            .push("bitmap", params.bitmap)
            .push("noexpire", params.no_expire);
        self.section.add("cache2", payload)
    }

    /// Preloads an item.
    pub fn add_item(self, key: &str, value: &str, cache_name: Option<&str>) -> &'a mut Section {
        let item = match cache_name {
            Some(cache) => format!("{cache} {key}={value}"),
            None => format!("{key}={value}"),
        };
        self.section.add("add-cache-item", item)
    }

    /// Preloads a file, keyed by its path.
    pub fn add_file(self, path: &str, cache_name: Option<&str>) -> &'a mut Section {
        let item = match cache_name {
            Some(cache) => format!("{cache} {path}"),
            None => path.to_string(),
        };
        self.section.add("load-file-in-cache", item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::test_util::{options, pair};
    use crate::SectionGroups;

    #[test]
    fn test_cache_declared_once() {
        let mut section = Section::default();
        for _ in 0..2 {
            section.caching().add_cache(
                "sessions",
                CacheParams {
                    max_items: Some(100),
                    bitmap: Some(true),
                    ..CacheParams::default()
                },
            );
        }
        section
            .caching()
            .add_item("motd", "hello", Some("sessions"))
            .caching()
            .add_file("/srv/robots.txt", None);
        assert_eq!(
            options(&section),
            vec![
                pair("cache2", "name=sessions,items=100,bitmap=1"),
                pair("add-cache-item", "sessions motd=hello"),
                pair("load-file-in-cache", "/srv/robots.txt"),
            ]
        );
    }
}
