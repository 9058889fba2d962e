/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! "View this place on another map": turn the current viewport into a URL for
//! an external mapping service.
//!
//! Most targets are a template plus a zoom range and resolve without
//! suspending. Camera-distance targets need the terrain elevation under the
//! view center, which is looked up asynchronously; a failed lookup is reported
//! to the [`ExceptionSink`] and replaced by a fixed elevation, so resolution
//! itself never fails because of it.

pub mod camera;

use std::sync::Arc;

use crate::model::geo::{LatLng, LatLngBounds};
use crate::services::elevation::{ElevationError, ElevationPoint, ElevationProvider};
use crate::shell::runtime::diagnostics::ExceptionSink;

pub const DEFAULT_FALLBACK_ELEVATION_M: f64 = 8000.0;

const ELEVATION_FAILURE_CONTEXT: &str = "failed to get elevation for GoogleEarth link";

/// What the live map reports when the user asks for an external link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSnapshot {
    pub center: LatLng,
    pub zoom: f64,
    pub bounds: LatLngBounds,
    pub window_height_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// `{lat}`, `{lng}`, `{zoom}`.
    Center,
    /// `{lat}`, `{lng}`, `{zoom}` and the camera range `{dist}`.
    CameraDistance,
    /// `{l}`, `{r}`, `{t}`, `{b}` from the visible bounds.
    Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalTarget {
    pub title: &'static str,
    pub template: &'static str,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub kind: TargetKind,
}

const fn target(
    title: &'static str,
    template: &'static str,
    min_zoom: f64,
    max_zoom: f64,
) -> ExternalTarget {
    ExternalTarget {
        title,
        template,
        min_zoom,
        max_zoom,
        kind: TargetKind::Center,
    }
}

pub const BUILTIN_TARGETS: &[ExternalTarget] = &[
    target("Google", "https://www.google.com/maps/@{lat},{lng},{zoom}z", 3.0, 21.0),
    target("Yandex", "https://yandex.ru/maps/?ll={lng}%2C{lat}&z={zoom}", 2.0, 21.0),
    target("OpenStreetMap", "https://www.openstreetmap.org/#map={zoom}/{lat}/{lng}", 0.0, 19.0),
    ExternalTarget {
        title: "Google Earth 3D",
        template: "https://earth.google.com/web/@{lat},{lng},0a,{dist}d,35y,0h,0t,0r",
        min_zoom: 0.0,
        max_zoom: 100.0,
        kind: TargetKind::CameraDistance,
    },
    target("Mapy.cz", "https://en.mapy.cz/turisticka?x={lng}&y={lat}&z={zoom}", 2.0, 19.0),
    target("Wikimapia", "https://wikimapia.org/#lat={lat}&lon={lng}&z={zoom}", 3.0, 22.0),
    target("ГИС для ПСР", "https://gis.extremum.org/#z={zoom}&c={lat},{lng}", 0.0, 19.0),
    target("BRouter", "https://brouter.de/brouter-web/#map={zoom}/{lat}/{lng}/standard", 0.0, 19.0),
    target("gpx.studio", "https://gpxstudio.github.io/", 0.0, 19.0),
    target("WTracks", "https://opoto.github.io/wtracks/", 0.0, 19.0),
    target("VeloRadar", "http://veloradar.ru/map/", 0.0, 19.0),
    ExternalTarget {
        title: "JOSM",
        template: "http://127.0.0.1:8111/load_and_zoom?left={l}&right={r}&top={t}&bottom={b}",
        min_zoom: 0.0,
        max_zoom: 19.0,
        kind: TargetKind::Bounds,
    },
];

/// Case-insensitive lookup by menu title.
pub fn find_target(title: &str) -> Option<&'static ExternalTarget> {
    let wanted = title.trim().to_lowercase();
    BUILTIN_TARGETS
        .iter()
        .find(|target| target.title.to_lowercase() == wanted)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    MissingPlaceholder(String),
    UnterminatedPlaceholder,
    InvalidUrl(url::ParseError),
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPlaceholder(name) => {
                write!(f, "no value provided for variable {{{name}}}")
            }
            Self::UnterminatedPlaceholder => write!(f, "template has an unterminated placeholder"),
            Self::InvalidUrl(error) => write!(f, "substituted template is not a URL: {error}"),
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUrl(error) => Some(error),
            Self::MissingPlaceholder(_) | Self::UnterminatedPlaceholder => None,
        }
    }
}

/// Single pass over `template`, replacing each `{name}` with `lookup(name)`.
/// Substituted text is not rescanned and nothing is escaped.
pub fn substitute<F>(template: &str, lookup: F) -> Result<String, LinkError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or(LinkError::UnterminatedPlaceholder)?;
        let name = after[..close].trim();
        let value = lookup(name).ok_or_else(|| LinkError::MissingPlaceholder(name.to_string()))?;
        out.push_str(&value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

impl ExternalTarget {
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.min(self.max_zoom).max(self.min_zoom)
    }

    pub fn needs_elevation(&self) -> bool {
        self.kind == TargetKind::CameraDistance
    }

    /// Build the URL from a snapshot. `dist` is only consulted by
    /// camera-distance targets; leaving it out for them is an error.
    pub fn url_with(
        &self,
        viewport: &ViewportSnapshot,
        dist: Option<f64>,
    ) -> Result<url::Url, LinkError> {
        let zoom = self.clamp_zoom(viewport.zoom);
        let centered = matches!(self.kind, TargetKind::Center | TargetKind::CameraDistance);
        let value = |name: &str| -> Option<f64> {
            match (self.kind, name) {
                (_, "lat") if centered => Some(viewport.center.lat),
                (_, "lng") if centered => Some(viewport.center.lng),
                (_, "zoom") if centered => Some(zoom),
                (TargetKind::CameraDistance, "dist") => dist,
                (TargetKind::Bounds, "l") => Some(viewport.bounds.west()),
                (TargetKind::Bounds, "r") => Some(viewport.bounds.east()),
                (TargetKind::Bounds, "t") => Some(viewport.bounds.north()),
                (TargetKind::Bounds, "b") => Some(viewport.bounds.south()),
                _ => None,
            }
        };
        let text = substitute(self.template, |name| value(name).map(|number| number.to_string()))?;
        url::Url::parse(&text).map_err(LinkError::InvalidUrl)
    }
}

/// Resolves targets against a viewport, looking up elevation when a target
/// needs it.
#[derive(Clone)]
pub struct LinkResolver {
    elevation: Arc<dyn ElevationProvider>,
    sink: Arc<dyn ExceptionSink>,
    fallback_elevation_m: f64,
}

impl std::fmt::Debug for LinkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkResolver")
            .field("fallback_elevation_m", &self.fallback_elevation_m)
            .finish_non_exhaustive()
    }
}

impl LinkResolver {
    pub fn new(elevation: Arc<dyn ElevationProvider>, sink: Arc<dyn ExceptionSink>) -> Self {
        Self {
            elevation,
            sink,
            fallback_elevation_m: DEFAULT_FALLBACK_ELEVATION_M,
        }
    }

    pub fn with_fallback_elevation(mut self, meters: f64) -> Self {
        self.fallback_elevation_m = meters;
        self
    }

    pub async fn resolve(
        &self,
        target: &ExternalTarget,
        viewport: &ViewportSnapshot,
    ) -> Result<url::Url, LinkError> {
        let dist = if target.needs_elevation() {
            let zoom = target.clamp_zoom(viewport.zoom);
            Some(
                self.camera_distance(viewport.center, zoom, viewport.window_height_px)
                    .await,
            )
        } else {
            None
        };
        let url = target.url_with(viewport, dist)?;
        log::debug!("resolved '{}' link: {url}", target.title);
        Ok(url)
    }

    /// Camera range over `center`; always a number, whatever the elevation
    /// lookup does.
    pub async fn camera_distance(&self, center: LatLng, zoom: f64, window_height_px: f64) -> f64 {
        let points = [ElevationPoint {
            position: center,
            zoom,
        }];
        let looked_up = self.elevation.get(&points).await.and_then(|values| match values[..] {
            [value] if value.is_finite() => Ok(value),
            [value] => Err(ElevationError::BadResponse(value.to_string())),
            _ => Err(ElevationError::LengthMismatch {
                expected: 1,
                got: values.len(),
            }),
        });
        let elevation = match looked_up {
            Ok(value) => value,
            Err(error) => {
                self.sink.capture_exception(&error, ELEVATION_FAILURE_CONTEXT);
                self.fallback_elevation_m
            }
        };
        camera::camera_distance(center.lat, zoom, window_height_px, elevation)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::future::BoxFuture;
    use rstest::rstest;

    use super::*;
    use crate::shell::runtime::diagnostics::{ChannelSink, DiagnosticEvent};

    struct FixedElevation(Result<Vec<f64>, ElevationError>);

    impl ElevationProvider for FixedElevation {
        fn get<'a>(
            &'a self,
            _points: &'a [ElevationPoint],
        ) -> BoxFuture<'a, Result<Vec<f64>, ElevationError>> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    fn viewport(lat: f64, lng: f64, zoom: f64) -> ViewportSnapshot {
        ViewportSnapshot {
            center: LatLng::new(lat, lng),
            zoom,
            bounds: [[59.5, 29.0], [60.5, 31.0]].into(),
            window_height_px: 900.0,
        }
    }

    fn by_title(title: &str) -> &'static ExternalTarget {
        find_target(title).expect("built-in target")
    }

    #[rstest]
    #[case::google_below_min("Google", 1.0, "https://www.google.com/maps/@60,30,3z")]
    #[case::google_above_max("Google", 25.0, "https://www.google.com/maps/@60,30,21z")]
    #[case::osm_inside("OpenStreetMap", 12.0, "https://www.openstreetmap.org/#map=12/60/30")]
    #[case::osm_above_max("OpenStreetMap", 20.0, "https://www.openstreetmap.org/#map=19/60/30")]
    #[case::yandex_below_min("Yandex", 0.0, "https://yandex.ru/maps/?ll=30%2C60&z=2")]
    #[case::wikimapia_fractional("Wikimapia", 23.5, "https://wikimapia.org/#lat=60&lon=30&z=22")]
    #[case::mapy_fractional_inside("Mapy.cz", 7.5, "https://en.mapy.cz/turisticka?x=30&y=60&z=7.5")]
    fn zoom_is_clamped_into_the_target_range(
        #[case] title: &str,
        #[case] zoom: f64,
        #[case] expected: &str,
    ) {
        let url = by_title(title)
            .url_with(&viewport(60.0, 30.0, zoom), None)
            .expect("center target resolves");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn static_targets_ignore_the_viewport() {
        let url = by_title("VeloRadar")
            .url_with(&viewport(10.0, 10.0, 30.0), None)
            .expect("no placeholders");
        assert_eq!(url.as_str(), "http://veloradar.ru/map/");
    }

    #[test]
    fn bounds_target_uses_the_visible_box() {
        let url = by_title("josm")
            .url_with(&viewport(60.0, 30.0, 9.0), None)
            .expect("bounds target resolves");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8111/load_and_zoom?left=29&right=31&top=60.5&bottom=59.5"
        );
    }

    #[test]
    fn camera_target_without_distance_reports_the_placeholder() {
        let err = by_title("Google Earth 3D")
            .url_with(&viewport(60.0, 30.0, 9.0), None)
            .expect_err("dist is required");
        assert_eq!(err, LinkError::MissingPlaceholder("dist".to_string()));
    }

    #[test]
    fn substitution_is_single_pass() {
        let text = substitute("{a}-{b}", |name| match name {
            "a" => Some("{b}".to_string()),
            "b" => Some("2".to_string()),
            _ => None,
        })
        .expect("both placeholders known");
        assert_eq!(text, "{b}-2");
        assert_eq!(
            substitute("x{open", |_| None),
            Err(LinkError::UnterminatedPlaceholder)
        );
    }

    #[tokio::test]
    async fn camera_distance_adds_the_looked_up_elevation() {
        let (sink, rx) = ChannelSink::unbounded();
        let resolver =
            LinkResolver::new(Arc::new(FixedElevation(Ok(vec![1200.0]))), Arc::new(sink));

        let center = LatLng::new(43.35, 42.44);
        let dist = resolver.camera_distance(center, 12.0, 900.0).await;

        assert!((dist - camera::camera_distance(43.35, 12.0, 900.0, 1200.0)).abs() < 1e-9);
        assert!(rx.try_recv().is_err(), "successful lookup reports nothing");
    }

    #[tokio::test]
    async fn rejected_elevation_falls_back_and_reports_once() {
        let (sink, rx) = ChannelSink::unbounded();
        let resolver = LinkResolver::new(
            Arc::new(FixedElevation(Err(ElevationError::Status(503)))),
            Arc::new(sink),
        );

        let url = resolver
            .resolve(by_title("Google Earth 3D"), &viewport(60.0, 30.0, 10.0))
            .await
            .expect("fallback keeps the link resolvable");

        let expected = camera::camera_distance(60.0, 10.0, 900.0, DEFAULT_FALLBACK_ELEVATION_M);
        assert!(expected.is_finite());
        assert_eq!(
            url.as_str(),
            format!("https://earth.google.com/web/@60,30,0a,{expected}d,35y,0h,0t,0r")
        );

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            DiagnosticEvent::Exception { context, .. } if context == ELEVATION_FAILURE_CONTEXT
        ));
    }

    #[tokio::test]
    async fn empty_elevation_answer_counts_as_failure() {
        let (sink, rx) = ChannelSink::unbounded();
        let resolver = LinkResolver::new(Arc::new(FixedElevation(Ok(Vec::new()))), Arc::new(sink))
            .with_fallback_elevation(100.0);

        let dist = resolver.camera_distance(LatLng::new(0.0, 0.0), 5.0, 900.0).await;

        assert!((dist - camera::camera_distance(0.0, 5.0, 900.0, 100.0)).abs() < 1e-9);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[tokio::test]
    async fn non_finite_elevation_is_reported_as_a_bad_value() {
        let (sink, rx) = ChannelSink::unbounded();
        let resolver =
            LinkResolver::new(Arc::new(FixedElevation(Ok(vec![f64::NAN]))), Arc::new(sink));

        let dist = resolver.camera_distance(LatLng::new(0.0, 0.0), 5.0, 900.0).await;

        let fallback = camera::camera_distance(0.0, 5.0, 900.0, DEFAULT_FALLBACK_ELEVATION_M);
        assert!((dist - fallback).abs() < 1e-9);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            DiagnosticEvent::Exception { error, .. } if error.contains("NaN")
        ));
    }
}
