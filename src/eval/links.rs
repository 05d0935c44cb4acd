// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Link import transport and fetch-once cache

use crate::error::Result;
use crate::parser::syntax::ModuleSyntax;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// Transport used to retrieve linked programs. Swapped out in tests.
pub trait LinkFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> anyhow::Result<String>;
}

/// Blocking HTTP(S) GET of the literal URL.
pub struct HttpFetcher;

impl LinkFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> anyhow::Result<String> {
        let body = ureq::get(url.as_str()).call()?.into_string()?;
        Ok(body)
    }
}

/// Exports of one linked program: its top-level modules and the constant
/// table as it stood after evaluation.
#[derive(Debug, Clone, Default)]
pub struct LinkEntry {
    pub modules: HashMap<String, Arc<ModuleSyntax>>,
    pub constants: HashMap<String, f64>,
}

/// Keyed by canonical URL text. Each URL is fetched and evaluated at most
/// once per cache; later links to the same URL reuse the entry. A failed
/// population leaves the slot empty so a later run may retry.
#[derive(Default)]
pub struct LinkCache {
    entries: Mutex<HashMap<String, Arc<Mutex<Option<Arc<LinkEntry>>>>>>,
}

impl LinkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `url`, invoking `populate` to produce it
    /// on first use. The per-URL slot lock is held while populating, so a
    /// concurrent resolve of the same URL blocks instead of fetching twice.
    /// Nested links to other URLs proceed because the outer map lock is not
    /// held during population.
    pub fn resolve(
        &self,
        url: &str,
        populate: impl FnOnce() -> Result<LinkEntry>,
    ) -> Result<Arc<LinkEntry>> {
        let slot = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            entries.entry(url.to_owned()).or_default().clone()
        };

        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = &*slot {
            return Ok(entry.clone());
        }
        let entry = Arc::new(populate()?);
        *slot = Some(entry.clone());
        Ok(entry)
    }
}
