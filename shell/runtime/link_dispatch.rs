/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Background resolution of external links.
//!
//! Each request becomes its own task in a [`JoinSet`]; a new request never
//! cancels one in flight, so two quick requests may both open a URL.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::services::external_links::{ExternalTarget, LinkError, LinkResolver, ViewportSnapshot};
use crate::shell::runtime::diagnostics::ExceptionSink;

/// Whatever shows a resolved URL to the user (browser tab, terminal, ...).
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &url::Url);
}

/// Writes the URL to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOpener;

impl UrlOpener for PrintOpener {
    fn open(&self, url: &url::Url) {
        println!("{url}");
    }
}

pub struct LinkDispatcher {
    resolver: LinkResolver,
    opener: Arc<dyn UrlOpener>,
    sink: Arc<dyn ExceptionSink>,
    requests: JoinSet<Result<url::Url, LinkError>>,
}

impl LinkDispatcher {
    pub fn new(
        resolver: LinkResolver,
        opener: Arc<dyn UrlOpener>,
        sink: Arc<dyn ExceptionSink>,
    ) -> Self {
        Self {
            resolver,
            opener,
            sink,
            requests: JoinSet::new(),
        }
    }

    /// Start resolving `target` for `viewport`; the URL is opened when ready.
    pub fn request(&mut self, target: &'static ExternalTarget, viewport: ViewportSnapshot) {
        self.reap_finished();
        let resolver = self.resolver.clone();
        let opener = Arc::clone(&self.opener);
        let sink = Arc::clone(&self.sink);
        self.requests.spawn(async move {
            match resolver.resolve(target, &viewport).await {
                Ok(url) => {
                    opener.open(&url);
                    Ok(url)
                }
                Err(error) => {
                    sink.capture_exception(&error, "failed to build external map link");
                    Err(error)
                }
            }
        });
        log::debug!("link_dispatch: '{}' requested", target.title);
    }

    /// Requests still being resolved. Finished ones are collected first.
    pub fn pending(&mut self) -> usize {
        self.reap_finished();
        self.requests.len()
    }

    /// Collect tasks that already completed; their URL was opened or their
    /// error reported when they finished.
    fn reap_finished(&mut self) {
        while let Some(joined) = self.requests.try_join_next() {
            if let Err(error) = joined {
                log::warn!("link_dispatch: request task failed: {error}");
            }
        }
    }

    /// Wait for every outstanding request, in completion order. Requests
    /// already collected by [`Self::pending`] or [`Self::request`] are not
    /// returned again.
    pub async fn drain(&mut self) -> Vec<Result<url::Url, LinkError>> {
        let mut finished = Vec::with_capacity(self.requests.len());
        while let Some(joined) = self.requests.join_next().await {
            match joined {
                Ok(result) => finished.push(result),
                Err(error) => log::warn!("link_dispatch: request task failed: {error}"),
            }
        }
        finished
    }
}
