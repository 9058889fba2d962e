//! Terrain elevation lookup.

use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::model::geo::LatLng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationPoint {
    pub position: LatLng,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElevationError {
    Transport(String),
    Status(u16),
    BadResponse(String),
    LengthMismatch { expected: usize, got: usize },
}

impl std::fmt::Display for ElevationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(reason) => write!(f, "elevation request failed: {reason}"),
            Self::Status(status) => write!(f, "elevation server answered HTTP {status}"),
            Self::BadResponse(line) => write!(f, "unparseable elevation value: {line:?}"),
            Self::LengthMismatch { expected, got } => {
                write!(f, "asked for {expected} elevations, got {got}")
            }
        }
    }
}

impl std::error::Error for ElevationError {}

/// Elevation in meters for each requested point, in request order.
pub trait ElevationProvider: Send + Sync {
    fn get<'a>(
        &'a self,
        points: &'a [ElevationPoint],
    ) -> BoxFuture<'a, Result<Vec<f64>, ElevationError>>;
}

/// Client for the plain-text elevation server: one `lat lng` line per point in
/// the request body, one number per line in the response.
#[derive(Debug, Clone)]
pub struct HttpElevationProvider {
    client: reqwest::Client,
    server: url::Url,
}

impl HttpElevationProvider {
    pub fn new(server: url::Url, timeout: Duration) -> Result<Self, ElevationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ElevationError::Transport(error.to_string()))?;
        Ok(Self { client, server })
    }

    pub fn server(&self) -> &url::Url {
        &self.server
    }

    async fn fetch(&self, points: &[ElevationPoint]) -> Result<Vec<f64>, ElevationError> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post(self.server.clone())
            .body(request_body(points))
            .send()
            .await
            .map_err(|error| ElevationError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ElevationError::Status(status.as_u16()));
        }
        let text = response
            .text()
            .await
            .map_err(|error| ElevationError::Transport(error.to_string()))?;
        log::debug!("elevation server returned {} byte(s)", text.len());
        parse_elevation_response(&text, points.len())
    }
}

impl ElevationProvider for HttpElevationProvider {
    fn get<'a>(
        &'a self,
        points: &'a [ElevationPoint],
    ) -> BoxFuture<'a, Result<Vec<f64>, ElevationError>> {
        Box::pin(self.fetch(points))
    }
}

pub fn request_body(points: &[ElevationPoint]) -> String {
    points
        .iter()
        .map(|point| format!("{:.6} {:.6}", point.position.lat, point.position.lng))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The server answers `NULL` for points it has no data for; that is treated
/// as a failed lookup like any other non-number.
pub fn parse_elevation_response(text: &str, expected: usize) -> Result<Vec<f64>, ElevationError> {
    let values = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| ElevationError::BadResponse(line.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != expected {
        return Err(ElevationError::LengthMismatch {
            expected,
            got: values.len(),
        });
    }
    Ok(values)
}
