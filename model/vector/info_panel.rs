//! Popup content for a selected track feature.

use serde::Serialize;

use super::{FeatureId, VectorFeature};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackIcon {
    Hike,
    Bike,
    Ski,
    Water,
    Other,
}

impl TrackIcon {
    pub fn from_kind(kind: Option<&str>) -> Self {
        match kind.map(str::to_ascii_lowercase).as_deref() {
            Some("hike" | "hiking" | "foot") => Self::Hike,
            Some("bike" | "bicycle" | "cycling") => Self::Bike,
            Some("ski" | "skiing") => Self::Ski,
            Some("water" | "boat" | "kayak") => Self::Water,
            _ => Self::Other,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Hike => "🥾",
            Self::Bike => "🚲",
            Self::Ski => "⛷",
            Self::Water => "🛶",
            Self::Other => "📍",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HoursMinutes {
    pub hours: u64,
    pub minutes: u64,
}

impl HoursMinutes {
    /// Whole minutes, truncated; negative or non-finite input counts as zero.
    pub fn from_seconds(seconds: f64) -> Self {
        let total_minutes = if seconds.is_finite() && seconds > 0.0 {
            (seconds / 60.0).floor() as u64
        } else {
            0
        };
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }
}

impl std::fmt::Display for HoursMinutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hours > 0 {
            write!(f, "{} h {} min", self.hours, self.minutes)
        } else {
            write!(f, "{} min", self.minutes)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoLink {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureInfo {
    pub name: String,
    pub distance_km: Option<f64>,
    pub icon: TrackIcon,
    pub ascent_descent_m: Option<(f64, f64)>,
    pub moving_stopped: Option<(HoursMinutes, HoursMinutes)>,
    pub links: Vec<InfoLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureInfoError {
    MissingName { feature_id: FeatureId },
}

impl std::fmt::Display for FeatureInfoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName { feature_id } => {
                write!(f, "feature '{feature_id}' has no name attribute")
            }
        }
    }
}

impl std::error::Error for FeatureInfoError {}

impl FeatureInfo {
    pub fn from_feature(
        feature: &VectorFeature,
        tracks_storage_url: &str,
    ) -> Result<Self, FeatureInfoError> {
        let name = feature
            .text("name")
            .ok_or_else(|| FeatureInfoError::MissingName {
                feature_id: feature.id.clone(),
            })?
            .to_string();

        let ascent_descent_m = feature
            .number("ascent")
            .zip(feature.number("descent"));
        let moving_stopped = feature
            .number("moving_time")
            .zip(feature.number("stopped_time"))
            .map(|(moving, stopped)| {
                (
                    HoursMinutes::from_seconds(moving),
                    HoursMinutes::from_seconds(stopped),
                )
            });

        let mut links = Vec::new();
        if let Some(file) = feature.text("file") {
            links.push(InfoLink {
                text: "Download".to_string(),
                href: format!("{}/{}", tracks_storage_url.trim_end_matches('/'), file),
            });
        }
        for index in 1.. {
            let text = feature.text(&format!("link{index}_text"));
            let href = feature.text(&format!("link{index}_href"));
            let (Some(text), Some(href)) = (text, href) else {
                break;
            };
            links.push(InfoLink {
                text: text.to_string(),
                href: href.to_string(),
            });
        }

        Ok(Self {
            name,
            distance_km: feature.number("distance"),
            icon: TrackIcon::from_kind(feature.text("type")),
            ascent_descent_m,
            moving_stopped,
            links,
        })
    }

    /// Text rows in display order, omitting whatever the feature lacks.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.name.clone()];
        if let Some(distance) = self.distance_km {
            lines.push(format!("{} {distance:.1} km", self.icon.glyph()));
        }
        if let Some((ascent, descent)) = self.ascent_descent_m {
            lines.push(format!("↗ {ascent:.0} m ↘ {descent:.0} m"));
        }
        if let Some((moving, stopped)) = &self.moving_stopped {
            lines.push(format!("moving {moving}, stopped {stopped}"));
        }
        lines.extend(
            self.links
                .iter()
                .map(|link| format!("{}: {}", link.text, link.href)),
        );
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE: &str = "https://tracks.example/";

    #[test]
    fn full_feature_produces_every_line() {
        let feature = VectorFeature::new("trail-42")
            .with_property("name", "Ridge loop")
            .with_property("type", "bike")
            .with_property("distance", 42.37)
            .with_property("ascent", 910)
            .with_property("descent", "905")
            .with_property("moving_time", 3.0 * 3600.0 + 25.0 * 60.0 + 59.0)
            .with_property("stopped_time", 50 * 60)
            .with_property("file", "2024/ridge.gpx");

        let info = FeatureInfo::from_feature(&feature, STORAGE).expect("named feature");

        assert_eq!(info.icon, TrackIcon::Bike);
        assert_eq!(info.ascent_descent_m, Some((910.0, 905.0)));
        assert_eq!(
            info.moving_stopped,
            Some((
                HoursMinutes { hours: 3, minutes: 25 },
                HoursMinutes { hours: 0, minutes: 50 },
            ))
        );
        assert_eq!(info.links[0].href, "https://tracks.example/2024/ridge.gpx");
        assert_eq!(
            info.lines(),
            vec![
                "Ridge loop".to_string(),
                "🚲 42.4 km".to_string(),
                "↗ 910 m ↘ 905 m".to_string(),
                "moving 3 h 25 min, stopped 50 min".to_string(),
                "Download: https://tracks.example/2024/ridge.gpx".to_string(),
            ]
        );
    }

    #[test]
    fn missing_optional_attributes_are_omitted() {
        let feature = VectorFeature::new("t")
            .with_property("name", "Walk")
            .with_property("ascent", 100);

        let info = FeatureInfo::from_feature(&feature, STORAGE).expect("named feature");

        assert_eq!(info.distance_km, None);
        assert_eq!(info.ascent_descent_m, None, "ascent alone is not shown");
        assert_eq!(info.moving_stopped, None);
        assert!(info.links.is_empty());
        assert_eq!(info.lines(), vec!["Walk".to_string()]);
    }

    #[test]
    fn link_scan_stops_at_the_first_gap() {
        let feature = VectorFeature::new("t")
            .with_property("name", "Gappy")
            .with_property("link1_text", "Report")
            .with_property("link1_href", "https://example.org/report")
            .with_property("link3_text", "Photos")
            .with_property("link3_href", "https://example.org/photos");

        let info = FeatureInfo::from_feature(&feature, STORAGE).expect("named feature");

        assert_eq!(
            info.links,
            vec![InfoLink {
                text: "Report".to_string(),
                href: "https://example.org/report".to_string(),
            }]
        );
    }

    #[test]
    fn half_a_link_pair_ends_the_scan() {
        let feature = VectorFeature::new("t")
            .with_property("name", "Half")
            .with_property("link1_text", "Only text");

        let info = FeatureInfo::from_feature(&feature, STORAGE).expect("named feature");
        assert!(info.links.is_empty());
    }

    #[test]
    fn unnamed_feature_is_rejected() {
        let feature = VectorFeature::new("anon").with_property("distance", 3);
        assert_eq!(
            FeatureInfo::from_feature(&feature, STORAGE),
            Err(FeatureInfoError::MissingName {
                feature_id: FeatureId::new("anon"),
            })
        );
    }

    #[test]
    fn durations_truncate_to_whole_minutes() {
        assert_eq!(HoursMinutes::from_seconds(59.9).to_string(), "0 min");
        assert_eq!(HoursMinutes::from_seconds(7260.0).to_string(), "2 h 1 min");
        assert_eq!(HoursMinutes::from_seconds(-5.0).to_string(), "0 min");
    }
}
