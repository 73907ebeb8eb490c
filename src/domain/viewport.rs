//! Web-Mercator camera fitting.
//!
//! Given a set of geographic points and a container size in pixels, compute
//! the camera (center and zoom) that shows every point, leaving a fixed
//! padding and shifting the points by a pixel offset.

use super::models::LatLng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Side length of the whole world, in pixels, at zoom 0.
pub const TILE_SIZE: f64 = 512.0;
/// Latitude at which the Mercator square ends.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

pub fn lng_lat_to_world(point: LatLng) -> WorldPoint {
    let phi = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    WorldPoint {
        x: TILE_SIZE * (point.lng + 180.0) / 360.0,
        y: TILE_SIZE * (1.0 - (FRAC_PI_4 + phi / 2.0).tan().ln() / PI) / 2.0,
    }
}

pub fn world_to_lng_lat(point: WorldPoint) -> LatLng {
    let lng = point.x / TILE_SIZE * 360.0 - 180.0;
    let m = PI * (1.0 - 2.0 * point.y / TILE_SIZE);
    let lat = (2.0 * m.exp().atan() - FRAC_PI_2).to_degrees();
    LatLng::new(lat, lng)
}

/// Measured pixel size of the map container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// False before the first layout pass has produced a real size.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Pixels kept free on every side of the fitted points.
    pub padding: f64,
    /// Pixel shift of the fitted points relative to the container center.
    pub offset: [f64; 2],
    pub max_zoom: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding: 20.0,
            offset: [0.0, -100.0],
            max_zoom: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Bounds { south: p.lat, west: p.lng, north: p.lat, east: p.lng },
                Some(b) => Bounds {
                    south: b.south.min(p.lat),
                    west: b.west.min(p.lng),
                    north: b.north.max(p.lat),
                    east: b.east.max(p.lng),
                },
            })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: LatLng,
    pub zoom: f64,
    pub size: ContainerSize,
}

impl Camera {
    pub fn scale(&self) -> f64 {
        self.zoom.exp2()
    }

    /// Pixel position of `point` relative to the container's top-left corner.
    pub fn project(&self, point: LatLng) -> (f64, f64) {
        let world = lng_lat_to_world(point);
        let center = lng_lat_to_world(self.center);
        let scale = self.scale();
        (
            (world.x - center.x) * scale + self.size.width / 2.0,
            (world.y - center.y) * scale + self.size.height / 2.0,
        )
    }

    pub fn unproject(&self, x: f64, y: f64) -> LatLng {
        let center = lng_lat_to_world(self.center);
        let scale = self.scale();
        world_to_lng_lat(WorldPoint {
            x: center.x + (x - self.size.width / 2.0) / scale,
            y: center.y + (y - self.size.height / 2.0) / scale,
        })
    }

    pub fn visible_bounds(&self) -> Bounds {
        let nw = self.unproject(0.0, 0.0);
        let se = self.unproject(self.size.width, self.size.height);
        Bounds { south: se.lat, west: nw.lng, north: nw.lat, east: se.lng }
    }
}

/// Fits a camera around `points`.
///
/// Returns `None` when the container has not been measured yet or there is
/// nothing to show, so callers never see a zero-size or NaN camera.
pub fn fit_bounds(points: &[LatLng], size: ContainerSize, options: &FitOptions) -> Option<Camera> {
    if !size.is_measured() {
        return None;
    }
    let bounds = Bounds::from_points(points)?;

    let nw = lng_lat_to_world(LatLng::new(bounds.north, bounds.west));
    let se = lng_lat_to_world(LatLng::new(bounds.south, bounds.east));
    let extent_x = (se.x - nw.x).abs();
    let extent_y = (se.y - nw.y).abs();

    let [offset_x, offset_y] = options.offset;
    let target_x = (size.width - 2.0 * options.padding - 2.0 * offset_x.abs()).max(1.0);
    let target_y = (size.height - 2.0 * options.padding - 2.0 * offset_y.abs()).max(1.0);

    // A zero extent divides to infinity, which lands on max_zoom below.
    let scale = (target_x / extent_x).min(target_y / extent_y);
    let zoom = if scale.is_finite() {
        scale.log2().min(options.max_zoom)
    } else {
        options.max_zoom
    };

    let scale = zoom.exp2();
    let center = world_to_lng_lat(WorldPoint {
        x: (nw.x + se.x) / 2.0 - offset_x / scale,
        y: (nw.y + se.y) / 2.0 - offset_y / scale,
    });

    Some(Camera { center, zoom, size })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn scenario_points() -> Vec<LatLng> {
        vec![LatLng::new(10.0, 20.0), LatLng::new(12.0, 22.0)]
    }

    #[test]
    fn test_projection_round_trip() {
        let point = LatLng::new(37.7749, -122.4194);
        let back = world_to_lng_lat(lng_lat_to_world(point));
        assert!((back.lat - point.lat).abs() < EPS);
        assert!((back.lng - point.lng).abs() < EPS);

        let origin = lng_lat_to_world(LatLng::new(0.0, 0.0));
        assert!((origin.x - TILE_SIZE / 2.0).abs() < EPS);
        assert!((origin.y - TILE_SIZE / 2.0).abs() < EPS);
    }

    #[test]
    fn test_unmeasured_container_yields_no_camera() {
        let options = FitOptions::default();
        assert!(fit_bounds(&scenario_points(), ContainerSize::default(), &options).is_none());
        assert!(fit_bounds(&scenario_points(), ContainerSize::new(800.0, 0.0), &options).is_none());
    }

    #[test]
    fn test_empty_points_yield_no_camera() {
        let options = FitOptions::default();
        assert!(fit_bounds(&[], ContainerSize::new(800.0, 600.0), &options).is_none());
    }

    #[test]
    fn test_fit_respects_padding_and_offset() {
        let size = ContainerSize::new(800.0, 600.0);
        let camera = fit_bounds(&scenario_points(), size, &FitOptions::default()).unwrap();
        assert!(camera.zoom.is_finite());

        // The bounds center sits 100px above the container center.
        let bounds = Bounds::from_points(&scenario_points()).unwrap();
        let nw = lng_lat_to_world(LatLng::new(bounds.north, bounds.west));
        let se = lng_lat_to_world(LatLng::new(bounds.south, bounds.east));
        let mid = world_to_lng_lat(WorldPoint { x: (nw.x + se.x) / 2.0, y: (nw.y + se.y) / 2.0 });
        let (cx, cy) = camera.project(mid);
        assert!((cx - 400.0).abs() < EPS);
        assert!((cy - 200.0).abs() < EPS);

        // Every point stays inside the padded area.
        for point in scenario_points() {
            let (x, y) = camera.project(point);
            assert!(x >= 20.0 - EPS && x <= 780.0 + EPS, "x = {x}");
            assert!(y >= 20.0 - EPS && y <= 580.0 + EPS, "y = {y}");
        }
    }

    #[test]
    fn test_fit_uses_the_tighter_axis() {
        let size = ContainerSize::new(800.0, 600.0);
        let options = FitOptions { padding: 0.0, offset: [0.0, 0.0], max_zoom: 20.0 };
        let points = vec![LatLng::new(0.0, -10.0), LatLng::new(0.0, 10.0)];
        let camera = fit_bounds(&points, size, &options).unwrap();

        let (left, _) = camera.project(points[0]);
        let (right, _) = camera.project(points[1]);
        assert!(left.abs() < 1e-3);
        assert!((right - 800.0).abs() < 1e-3);
    }

    #[test]
    fn test_single_point_uses_max_zoom() {
        let options = FitOptions { max_zoom: 16.0, ..FitOptions::default() };
        let camera = fit_bounds(&[LatLng::new(48.85, 2.35)], ContainerSize::new(400.0, 400.0), &options).unwrap();
        assert_eq!(camera.zoom, 16.0);
        let (x, y) = camera.project(LatLng::new(48.85, 2.35));
        assert!((x - 200.0).abs() < 1e-3);
        assert!((y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_tiny_container_stays_finite() {
        let camera = fit_bounds(&scenario_points(), ContainerSize::new(10.0, 10.0), &FitOptions::default()).unwrap();
        assert!(camera.zoom.is_finite());
        assert!(camera.center.lat.is_finite() && camera.center.lng.is_finite());
    }

    #[test]
    fn test_visible_bounds_cover_points() {
        let camera = fit_bounds(&scenario_points(), ContainerSize::new(800.0, 600.0), &FitOptions::default()).unwrap();
        let visible = camera.visible_bounds();
        for point in scenario_points() {
            assert!(point.lat > visible.south && point.lat < visible.north);
            assert!(point.lng > visible.west && point.lng < visible.east);
        }
    }
}
