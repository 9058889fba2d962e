/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::model::geo::LatLng;

pub const ENV_ELEVATION_SERVER: &str = "MAPDECK_ELEVATION_SERVER";
pub const ENV_DISPLAY_DENSITY: &str = "MAPDECK_DISPLAY_DENSITY";
pub const ENV_LOG: &str = "MAPDECK_LOG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppPreferences {
    pub elevation_server: String,
    pub elevation_timeout_ms: u64,
    pub fallback_elevation_m: f64,
    pub tracks_storage_url: String,
    pub display_density: f64,
    pub window_height_px: f64,
    pub default_location: [f64; 2],
    pub default_zoom: u8,
    pub log_filter: Option<String>,
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            elevation_server: "https://ele.sikmir.ru/".to_string(),
            elevation_timeout_ms: 5000,
            fallback_elevation_m: 8000.0,
            tracks_storage_url: "https://tracks.sikmir.ru".to_string(),
            display_density: 1.0,
            window_height_px: 900.0,
            default_location: [60.0, 30.0],
            default_zoom: 7,
            log_filter: None,
        }
    }
}

#[derive(Debug)]
pub enum PrefsError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidValue { key: &'static str, value: String },
}

impl std::fmt::Display for PrefsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: {value:?}"),
        }
    }
}

impl std::error::Error for PrefsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl AppPreferences {
    pub fn from_toml_file(path: &Path) -> Result<Self, PrefsError> {
        let text = std::fs::read_to_string(path).map_err(|source| PrefsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| PrefsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the file (if any), then the process environment.
    pub fn load(config: Option<&Path>) -> Result<Self, PrefsError> {
        let mut prefs = match config {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        prefs.apply_env(|key| std::env::var(key).ok())?;
        Ok(prefs)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), PrefsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(server) = lookup(ENV_ELEVATION_SERVER) {
            self.elevation_server = server;
        }
        if let Some(raw) = lookup(ENV_DISPLAY_DENSITY) {
            self.display_density = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|density| density.is_finite() && *density > 0.0)
                .ok_or(PrefsError::InvalidValue {
                    key: ENV_DISPLAY_DENSITY,
                    value: raw,
                })?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = Some(filter);
        }
        Ok(())
    }

    pub fn elevation_server_url(&self) -> Result<url::Url, PrefsError> {
        url::Url::parse(&self.elevation_server).map_err(|_| PrefsError::InvalidValue {
            key: "elevation_server",
            value: self.elevation_server.clone(),
        })
    }

    pub fn elevation_timeout(&self) -> Duration {
        Duration::from_millis(self.elevation_timeout_ms)
    }

    pub fn default_center(&self) -> LatLng {
        let [lat, lng] = self.default_location;
        LatLng::new(lat, lng)
    }
}
