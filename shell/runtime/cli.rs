/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use bpaf::Bpaf;

use crate::model::geo::{LatLng, LatLngBounds};
use crate::registries::catalog::AssembledCatalog;
use crate::registries::catalog::seed::core_seed;
use crate::services::elevation::HttpElevationProvider;
use crate::services::external_links::{
    BUILTIN_TARGETS, ExternalTarget, LinkResolver, TargetKind, ViewportSnapshot, find_target,
};
use crate::shell::runtime::diagnostics::{ExceptionSink, LogSink};
use crate::shell::runtime::link_dispatch::{LinkDispatcher, PrintOpener};
use crate::shell::runtime::prefs::AppPreferences;

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
/// Layer catalog and external map links
pub struct CliArgs {
    /// TOML preferences file
    #[bpaf(long, argument("PATH"))]
    pub config: Option<PathBuf>,
    /// Log filter directives, e.g. `mapdeck=debug`
    #[bpaf(long("log"), argument("FILTER"))]
    pub log: Option<String>,
    #[bpaf(external(command))]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Bpaf)]
pub enum Command {
    /// Print the assembled layer catalog
    #[bpaf(command)]
    Catalog {
        /// Emit JSON instead of the group listing
        #[bpaf(long)]
        json: bool,
        /// Only list the layers a permalink code string selects
        #[bpaf(long, argument("CODES"))]
        codes: Option<String>,
    },
    /// List the external map targets
    #[bpaf(command)]
    Targets {
        /// Include each target's URL template
        #[bpaf(long)]
        verbose: bool,
    },
    /// Resolve an external map link for a viewport
    #[bpaf(command)]
    Link {
        #[bpaf(long, argument("DEG"))]
        lat: f64,
        #[bpaf(long, argument("DEG"))]
        lng: f64,
        #[bpaf(long, argument("ZOOM"))]
        zoom: f64,
        #[bpaf(long, argument("DEG"))]
        west: Option<f64>,
        #[bpaf(long, argument("DEG"))]
        east: Option<f64>,
        #[bpaf(long, argument("DEG"))]
        north: Option<f64>,
        #[bpaf(long, argument("DEG"))]
        south: Option<f64>,
        /// Map window height in pixels
        #[bpaf(long, argument("PX"))]
        height: Option<f64>,
        /// Target title, e.g. "Google Earth 3D"
        #[bpaf(positional("TARGET"))]
        target: String,
    },
}

#[derive(Debug)]
pub enum CliError {
    Startup(String),
    UnknownTarget(String),
    MissingBounds(&'static str),
    Output(std::io::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Startup(reason) => write!(f, "startup failed: {reason}"),
            Self::UnknownTarget(title) => write!(f, "no external map named '{title}'"),
            Self::MissingBounds(title) => {
                write!(f, "'{title}' needs --west, --east, --north and --south")
            }
            Self::Output(error) => write!(f, "cannot write output: {error}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Output(error)
    }
}

pub fn main() {
    let args = cli_args().run();

    let prefs = match AppPreferences::load(args.config.as_deref()) {
        Ok(prefs) => prefs,
        Err(e) => {
            crate::init_tracing(args.log.as_deref());
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    crate::init_tracing(args.log.as_deref().or(prefs.log_filter.as_deref()));
    log::debug!("mapdeck {} session {}", crate::VERSION, super::diagnostics::session_id());

    let catalog = match core_seed() {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("built-in layer table is invalid: {e}");
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    if let Err(e) = run(args.command, &catalog, &prefs, &mut stdout.lock()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

pub fn run(
    command: Command,
    catalog: &AssembledCatalog,
    prefs: &AppPreferences,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Catalog { json, codes } => print_catalog(catalog, json, codes.as_deref(), out),
        Command::Targets { verbose } => {
            for target in BUILTIN_TARGETS {
                if verbose {
                    writeln!(out, "{}\t{}", target.title, target.template)?;
                } else {
                    writeln!(out, "{}", target.title)?;
                }
            }
            Ok(())
        }
        Command::Link {
            lat,
            lng,
            zoom,
            west,
            east,
            north,
            south,
            height,
            target,
        } => {
            let target = find_target(&target).ok_or(CliError::UnknownTarget(target))?;
            let center = LatLng::new(lat, lng);
            let bounds = match (west, east, north, south) {
                (Some(west), Some(east), Some(north), Some(south)) => {
                    LatLngBounds::new(LatLng::new(south, west), LatLng::new(north, east))
                }
                _ if target.kind == TargetKind::Bounds => {
                    return Err(CliError::MissingBounds(target.title));
                }
                _ => LatLngBounds::new(center, center),
            };
            let viewport = ViewportSnapshot {
                center,
                zoom,
                bounds,
                window_height_px: height.unwrap_or(prefs.window_height_px),
            };
            resolve_and_open(target, viewport, prefs)
        }
    }
}

fn print_catalog(
    catalog: &AssembledCatalog,
    json: bool,
    codes: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if let Some(codes) = codes {
        for entry in catalog.decode_codes(codes) {
            writeln!(out, "{}\t{}", entry.descriptor.code, entry.meta.title)?;
        }
        return Ok(());
    }
    if json {
        let text = serde_json::to_string_pretty(catalog)
            .map_err(|e| CliError::Output(std::io::Error::other(e)))?;
        writeln!(out, "{text}")?;
        return Ok(());
    }
    for group in catalog.groups() {
        writeln!(out, "{}", group.title)?;
        for entry in &group.layers {
            let kind = if entry.descriptor.is_overlay { "overlay" } else { "base" };
            writeln!(
                out,
                "  {:>3} {:<6} {:<8} {:<20} {}",
                entry.order,
                entry.descriptor.code,
                kind,
                entry.descriptor.backend.variant_name(),
                entry.meta.title
            )?;
        }
    }
    Ok(())
}

fn resolve_and_open(
    target: &'static ExternalTarget,
    viewport: ViewportSnapshot,
    prefs: &AppPreferences,
) -> Result<(), CliError> {
    let server = prefs
        .elevation_server_url()
        .map_err(|e| CliError::Startup(e.to_string()))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Startup(e.to_string()))?;

    runtime.block_on(async {
        let elevation = HttpElevationProvider::new(server, prefs.elevation_timeout())
            .map_err(|e| CliError::Startup(e.to_string()))?;
        let sink: Arc<dyn ExceptionSink> = Arc::new(LogSink);
        let resolver = LinkResolver::new(Arc::new(elevation), Arc::clone(&sink))
            .with_fallback_elevation(prefs.fallback_elevation_m);
        let mut dispatcher = LinkDispatcher::new(resolver, Arc::new(PrintOpener), sink);
        dispatcher.request(target, viewport);
        // Resolution failures are already reported through the sink.
        let failed = dispatcher.drain().await.into_iter().any(|result| result.is_err());
        if failed {
            log::warn!("could not build a link for '{}'", target.title);
        }
        Ok(())
    })
}
