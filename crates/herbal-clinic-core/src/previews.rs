//! Local preview URLs for files picked before upload.
//!
//! Every URL created is revoked exactly once: on removal, replacement,
//! clearing or when the list is dropped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Host facility that turns bytes into a displayable URL.
#[uniffi::export(with_foreign)]
pub trait ObjectUrls: Send + Sync {
    fn create(&self, bytes: Vec<u8>, mime: String) -> String;
    fn revoke(&self, url: String);
}

/// In-process URL registry for headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryObjectUrls {
    state: Mutex<UrlState>,
}

#[derive(Debug, Default)]
struct UrlState {
    active: HashSet<String>,
    revoked: Vec<String>,
}

impl MemoryObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, UrlState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn active_count(&self) -> usize {
        self.state().active.len()
    }

    pub fn revoked_count(&self) -> usize {
        self.state().revoked.len()
    }

    pub fn is_active(&self, url: &str) -> bool {
        self.state().active.contains(url)
    }
}

impl ObjectUrls for MemoryObjectUrls {
    fn create(&self, _bytes: Vec<u8>, _mime: String) -> String {
        let url = format!("blob:{}", Uuid::new_v4());
        self.state().active.insert(url.clone());
        url
    }

    fn revoke(&self, url: String) {
        let mut state = self.state();
        if state.active.remove(&url) {
            state.revoked.push(url);
        } else {
            log::warn!("Revoking unknown preview URL {}", url);
        }
    }
}

impl<U: ObjectUrls + ?Sized> ObjectUrls for &U {
    fn create(&self, bytes: Vec<u8>, mime: String) -> String {
        (**self).create(bytes, mime)
    }

    fn revoke(&self, url: String) {
        (**self).revoke(url)
    }
}

impl<U: ObjectUrls + ?Sized> ObjectUrls for Arc<U> {
    fn create(&self, bytes: Vec<u8>, mime: String) -> String {
        (**self).create(bytes, mime)
    }

    fn revoke(&self, url: String) {
        (**self).revoke(url)
    }
}

/// A picked file with its preview URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file_name: String,
    pub mime: String,
    pub url: String,
}

/// Ordered previews of files pending upload.
pub struct PreviewList<U: ObjectUrls> {
    urls: U,
    items: Vec<Preview>,
}

impl<U: ObjectUrls> PreviewList<U> {
    pub fn new(urls: U) -> Self {
        Self {
            urls,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Preview] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> &Preview {
        let mime = mime.into();
        let url = self.urls.create(bytes, mime.clone());
        let index = self.items.len();
        self.items.push(Preview {
            file_name: file_name.into(),
            mime,
            url,
        });
        &self.items[index]
    }

    /// Remove one preview, revoking its URL. `None` if out of range.
    pub fn remove(&mut self, index: usize) -> Option<Preview> {
        if index >= self.items.len() {
            return None;
        }
        let preview = self.items.remove(index);
        self.urls.revoke(preview.url.clone());
        Some(preview)
    }

    /// Swap the file at `index`, revoking the old URL. Returns false if out
    /// of range.
    pub fn replace(
        &mut self,
        index: usize,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> bool {
        let Some(slot) = self.items.get_mut(index) else {
            return false;
        };
        let mime = mime.into();
        let url = self.urls.create(bytes, mime.clone());
        let old = std::mem::replace(
            slot,
            Preview {
                file_name: file_name.into(),
                mime,
                url,
            },
        );
        self.urls.revoke(old.url);
        true
    }

    pub fn clear(&mut self) {
        for preview in self.items.drain(..) {
            self.urls.revoke(preview.url);
        }
    }
}

impl<U: ObjectUrls> Drop for PreviewList<U> {
    fn drop(&mut self) {
        self.clear();
    }
}
