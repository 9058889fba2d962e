use std::sync::Arc;

use futures_util::future::BoxFuture;
use mapdeck::VERSION;
use mapdeck::model::geo::LatLng;
use mapdeck::model::layer::{
    LayerError, LayerInstance, MapSurface, RenderUnit, SurfaceError, UnitHandle,
};
use mapdeck::model::vector::selection::{FeatureStyle, FeatureStyler, SelectionState};
use mapdeck::model::vector::{FeatureId, VectorFeature};
use mapdeck::registries::catalog::seed::core_seed;
use mapdeck::services::elevation::{ElevationError, ElevationPoint, ElevationProvider};
use mapdeck::services::external_links::{LinkResolver, ViewportSnapshot, find_target};
use mapdeck::shell::runtime::diagnostics::{ChannelSink, DiagnosticEvent};

#[derive(Default)]
struct Surface {
    next: u64,
    live: Vec<(UnitHandle, RenderUnit)>,
    refuse_after: Option<usize>,
}

impl MapSurface for Surface {
    fn add_unit(&mut self, unit: &RenderUnit) -> Result<UnitHandle, SurfaceError> {
        if self.refuse_after.is_some_and(|limit| self.live.len() >= limit) {
            return Err(SurfaceError::new("out of texture memory"));
        }
        self.next += 1;
        let handle = UnitHandle(self.next);
        self.live.push((handle, unit.clone()));
        Ok(handle)
    }

    fn remove_unit(&mut self, handle: UnitHandle) {
        self.live.retain(|(live, _)| *live != handle);
    }
}

#[derive(Default)]
struct Styles {
    highlighted: Vec<FeatureId>,
}

impl FeatureStyler for Styles {
    fn set_feature_style(&mut self, id: &FeatureId, _style: FeatureStyle) {
        self.highlighted.push(id.clone());
    }

    fn reset_feature_style(&mut self, id: &FeatureId) {
        self.highlighted.retain(|live| live != id);
    }
}

struct Unreachable;

impl ElevationProvider for Unreachable {
    fn get<'a>(
        &'a self,
        _points: &'a [ElevationPoint],
    ) -> BoxFuture<'a, Result<Vec<f64>, ElevationError>> {
        Box::pin(async { Err(ElevationError::Transport("connection refused".to_string())) })
    }
}

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}

#[test]
fn builtin_catalog_defaults_mount_in_rank_order() {
    let catalog = core_seed().expect("built-in table assembles");
    let mut surface = Surface::default();

    let mut instances: Vec<LayerInstance> = catalog
        .default_titles()
        .into_iter()
        .filter_map(|title| catalog.get(title).cloned())
        .map(LayerInstance::new)
        .collect();
    for instance in &mut instances {
        instance.enable(&mut surface, 1.0).expect("default layer mounts");
    }

    assert!(instances.iter().all(LayerInstance::is_enabled));
    let ranks: Vec<u32> = instances.iter().map(LayerInstance::rank).collect();
    assert!(ranks.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(surface.live.iter().all(|(_, unit)| {
        catalog.get(&unit.layer_title).map(|entry| entry.order) == Some(unit.z_order)
    }));
}

#[test]
fn wrapper_rejected_midway_leaves_nothing_behind() {
    let catalog = core_seed().expect("built-in table assembles");
    let winter = catalog.get("mapy.cz winter").expect("wrapper layer").clone();
    let mut surface = Surface {
        refuse_after: Some(1),
        ..Surface::default()
    };
    let mut layer = LayerInstance::new(winter);

    let err = layer.enable(&mut surface, 1.0).expect_err("second sublayer refused");

    assert!(matches!(err, LayerError::Rejected { sub_index: 1, .. }));
    assert!(!layer.is_enabled());
    assert!(surface.live.is_empty());

    surface.refuse_after = None;
    assert_eq!(layer.toggle(&mut surface, 1.0), Ok(true));
    assert_eq!(surface.live.len(), 2);
}

#[test]
fn vector_track_selection_round_trip() {
    let catalog = core_seed().expect("built-in table assembles");
    let tracks = catalog.find_by_code("Mytv").expect("vector tracks layer").clone();
    let mut surface = Surface::default();
    let mut styles = Styles::default();
    let mut layer = LayerInstance::new(tracks);
    layer.enable(&mut surface, 1.0).expect("vector layer mounts");

    let feature = VectorFeature::new("42")
        .with_property("name", "Elbrus approach")
        .with_property("distance", 12.3)
        .with_property("type", "hike")
        .with_property("file", "elbrus.gpx");
    let controller = layer.feature_controller_mut().expect("interactive layer");
    let outcome = controller
        .select(&feature, &mut styles, "https://tracks.example/")
        .expect("named feature");

    assert_eq!(outcome.info.name, "Elbrus approach");
    assert_eq!(outcome.info.distance_km, Some(12.3));
    assert!(outcome.info.lines().iter().any(|line| line.ends_with("12.3 km")));
    assert_eq!(outcome.replaced, None);
    assert_eq!(styles.highlighted, vec![FeatureId::from("42")]);

    controller.popup_closed(&mut styles);
    assert_eq!(controller.state(), &SelectionState::Idle);
    assert!(styles.highlighted.is_empty());
}

#[tokio::test]
async fn earth_link_survives_an_unreachable_elevation_server() {
    let (sink, events) = ChannelSink::unbounded();
    let resolver = LinkResolver::new(Arc::new(Unreachable), Arc::new(sink));
    let viewport = ViewportSnapshot {
        center: LatLng::new(46.55, 7.98),
        zoom: 13.0,
        bounds: [[46.5, 7.9], [46.6, 8.1]].into(),
        window_height_px: 900.0,
    };

    let url = resolver
        .resolve(find_target("google earth 3d").expect("built-in"), &viewport)
        .await
        .expect("fallback elevation keeps the link valid");

    assert!(url.as_str().starts_with("https://earth.google.com/web/@46.55,7.98,0a,"));
    assert!(!url.as_str().contains("NaN"));
    let reported: Vec<DiagnosticEvent> = events.try_iter().collect();
    assert_eq!(reported.len(), 1);
}
