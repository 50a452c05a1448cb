//! Notebook name cache
//!
//! The gate never talks to the notebook service. It asks a [`NotebookCache`]
//! for the currently loaded notebook, for the display names behind opaque
//! section and page IDs, and for the section a page lives in.

use crate::error::LookupError;
use crate::notebook::types::{NotebookRecord, SectionRecord};
// async_trait required for dyn-compatibility with &dyn NotebookCache
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Name lookups used by the resource context extractor
///
/// The `fetch_*` methods are the network fallback used on a cache miss.
/// Their default implementations resolve nothing, so a cache without a
/// fallback only implements the synchronous lookups.
#[async_trait]
pub trait NotebookCache: Send + Sync {
    /// Currently loaded notebook, if any
    fn current_notebook(&self) -> Option<NotebookRecord>;

    /// Section display name from the cache only
    fn cached_section_name(&self, section_id: &str) -> Option<String>;

    /// Page title from the cache only
    fn cached_page_name(&self, page_id: &str) -> Option<String>;

    /// Parent section of a page from the cache only
    ///
    /// An empty `display_name` means the section ID is known but its name
    /// is not.
    fn cached_page_section(&self, _page_id: &str) -> Option<SectionRecord> {
        None
    }

    /// Resolve a section name outside the cache (may block on the network)
    async fn fetch_section_name(&self, _section_id: &str) -> Result<Option<String>, LookupError> {
        Ok(None)
    }

    /// Resolve a page title outside the cache (may block on the network)
    async fn fetch_page_name(&self, _page_id: &str) -> Result<Option<String>, LookupError> {
        Ok(None)
    }

    /// Resolve a page's parent section outside the cache
    async fn fetch_page_section(
        &self,
        _page_id: &str,
    ) -> Result<Option<SectionRecord>, LookupError> {
        Ok(None)
    }
}

/// In-memory cache without a network fallback
#[derive(Debug, Default)]
pub struct InMemoryNotebookCache {
    data: RwLock<CacheData>,
}

#[derive(Debug, Default)]
struct CacheData {
    notebook: Option<NotebookRecord>,
    sections: HashMap<String, String>,
    pages: HashMap<String, String>,
    // page ID -> section ID
    page_sections: HashMap<String, String>,
}

impl InMemoryNotebookCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`set_notebook`](Self::set_notebook)
    pub fn with_notebook(self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.set_notebook(NotebookRecord::new(id, name));
        self
    }

    pub fn with_section(self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.insert_section(id, name);
        self
    }

    pub fn with_page(self, id: impl Into<String>, title: impl Into<String>) -> Self {
        self.insert_page(id, title);
        self
    }

    /// Builder-style variant of [`insert_page_in_section`](Self::insert_page_in_section)
    pub fn with_page_in_section(
        self,
        id: impl Into<String>,
        title: impl Into<String>,
        section_id: impl Into<String>,
    ) -> Self {
        self.insert_page_in_section(id, title, section_id);
        self
    }

    /// Replace the loaded notebook, clearing cached section and page names
    pub fn set_notebook(&self, notebook: NotebookRecord) {
        let mut data = self.write_data();
        data.notebook = Some(notebook);
        data.sections.clear();
        data.pages.clear();
        data.page_sections.clear();
    }

    pub fn insert_section(&self, id: impl Into<String>, name: impl Into<String>) {
        self.write_data().sections.insert(id.into(), name.into());
    }

    pub fn insert_page(&self, id: impl Into<String>, title: impl Into<String>) {
        self.write_data().pages.insert(id.into(), title.into());
    }

    /// Record a page together with the section containing it
    pub fn insert_page_in_section(
        &self,
        id: impl Into<String>,
        title: impl Into<String>,
        section_id: impl Into<String>,
    ) {
        let id = id.into();
        let mut data = self.write_data();
        data.pages.insert(id.clone(), title.into());
        data.page_sections.insert(id, section_id.into());
    }

    // Poisoned locks are recovered: the maps stay usable after a panic elsewhere

    fn write_data(&self) -> RwLockWriteGuard<'_, CacheData> {
        self.data.write().unwrap_or_else(|poisoned| {
            tracing::warn!("notebook cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn read_data(&self) -> RwLockReadGuard<'_, CacheData> {
        self.data.read().unwrap_or_else(|poisoned| {
            tracing::warn!("notebook cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[async_trait]
impl NotebookCache for InMemoryNotebookCache {
    fn current_notebook(&self) -> Option<NotebookRecord> {
        self.read_data().notebook.clone()
    }

    fn cached_section_name(&self, section_id: &str) -> Option<String> {
        self.read_data().sections.get(section_id).cloned()
    }

    fn cached_page_name(&self, page_id: &str) -> Option<String> {
        self.read_data().pages.get(page_id).cloned()
    }

    fn cached_page_section(&self, page_id: &str) -> Option<SectionRecord> {
        let data = self.read_data();
        let section_id = data.page_sections.get(page_id)?;
        let name = data.sections.get(section_id).cloned().unwrap_or_default();
        Some(SectionRecord::new(section_id.clone(), name))
    }
}
