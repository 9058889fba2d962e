/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Layer catalog and interaction core for a tiled map viewer.
//!
//! The crate assembles a totally-ordered, grouped catalog of map layers from
//! three independently authored lists ([`registries::catalog`]), reduces every
//! layer backend to one of four composite variants ([`model::layer`]), drives
//! per-feature selection on interactive vector tiles ([`model::vector`]) and
//! translates the live viewport into links for external mapping tools
//! ([`services::external_links`]).

pub mod model;
pub mod registries;
pub mod services;
pub mod shell;

use tracing_subscriber::EnvFilter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LOG_FILTER: &str = "info";

/// Install the process-wide fmt subscriber.
///
/// `filter` wins over `RUST_LOG`; both fall back to `info`. `log` records are
/// forwarded into the subscriber. Calling this more than once is harmless.
pub fn init_tracing(filter: Option<&str>) {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        log::debug!("tracing subscriber already installed");
    }
}
