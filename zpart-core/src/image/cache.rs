//! Listing cache for `virt-filesystems`, invalidated by the image's modification time.
//!
//! Checking freshness never changes the cache; [`ListingCache::refresh`] is the only step that
//! forgets entries and records a new mtime.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;
use zpart_hal::Inventory;

#[derive(Debug, Clone, Default)]
pub struct ListingCache {
    last_known_mtime: Option<SystemTime>,
    entries: BTreeMap<Inventory, String>,
}

/// Modification time of `path`, `None` when it cannot be read.
pub fn image_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_known_mtime(&self) -> Option<SystemTime> {
        self.last_known_mtime
    }

    /// Whether entries were recorded against `current_mtime`. An unknown mtime is never fresh.
    pub fn is_fresh(&self, current_mtime: Option<SystemTime>) -> bool {
        current_mtime.is_some() && current_mtime == self.last_known_mtime
    }

    /// Drop every entry if the image changed since the last refresh.
    pub fn refresh(&mut self, current_mtime: Option<SystemTime>) {
        if self.is_fresh(current_mtime) {
            return;
        }
        if !self.entries.is_empty() {
            log::debug!("image changed, dropping {} cached listing(s)", self.entries.len());
        }
        self.entries.clear();
        self.last_known_mtime = current_mtime;
    }

    pub fn get(&self, what: Inventory) -> Option<&str> {
        self.entries.get(&what).map(String::as_str)
    }

    /// Refresh against `current_mtime`, then return the cached listing or fill it.
    pub fn get_or_fill<E>(
        &mut self,
        what: Inventory,
        current_mtime: Option<SystemTime>,
        fill: impl FnOnce() -> Result<String, E>,
    ) -> Result<&str, E> {
        self.refresh(current_mtime);
        if !self.entries.contains_key(&what) {
            let listing = fill()?;
            self.entries.insert(what, listing);
        }
        Ok(self.get(what).unwrap_or_default())
    }
}
