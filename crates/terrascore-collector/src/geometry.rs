//! Sampling geometry: where the collector asks for imagery
//!
//! A county polygon is simplified, then reduced to one or more circular regions of
//! `buffer_radius_m` around its centroid or around grid points inside it. Sample
//! points are spread over each region on a golden-angle spiral, so the same county
//! and configuration always yield the same points.

use crate::CollectorConfig;
use geo::{BoundingRect, Centroid, Contains, LineString, MultiPolygon, Point, Polygon, Simplify};
use std::f64::consts::{PI, TAU};

/// Meters per degree of latitude
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Vertices used to approximate a circle
const CIRCLE_VERTICES: usize = 32;

/// Region and points for one imagery query
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingPlan {
    /// Region scenes must intersect
    pub region: Polygon<f64>,
    /// Region centers
    pub centers: Vec<Point<f64>>,
    /// Sample points
    pub points: Vec<Point<f64>>,
}

/// Build the sampling plan for a county boundary
///
/// Returns `None` for an empty geometry.
pub fn plan(geometry: &MultiPolygon<f64>, config: &CollectorConfig) -> Option<SamplingPlan> {
    let simplified = geometry.simplify(&config.simplify_tolerance_deg);
    let centroid = simplified.centroid().or_else(|| geometry.centroid())?;

    let mut centers = if config.sample_grid > 1 {
        grid_centers(&simplified, config.sample_grid)
    } else {
        Vec::new()
    };
    if centers.is_empty() {
        centers.push(centroid);
    }

    let points = centers
        .iter()
        .flat_map(|c| {
            spiral_points(
                *c,
                config.buffer_radius_m,
                config.points_per_region,
                config.sample_seed,
            )
        })
        .collect();

    let region = if centers.len() == 1 {
        circle(centers[0], config.buffer_radius_m)
    } else {
        envelope(&centers, config.buffer_radius_m)
    };

    Some(SamplingPlan {
        region,
        centers,
        points,
    })
}

/// Cell centers of an `n × n` grid over the bounding box that fall inside the polygon
fn grid_centers(geometry: &MultiPolygon<f64>, n: usize) -> Vec<Point<f64>> {
    let Some(rect) = geometry.bounding_rect() else {
        return Vec::new();
    };
    let dx = rect.width() / n as f64;
    let dy = rect.height() / n as f64;

    let mut centers = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let p = Point::new(
                rect.min().x + dx * (col as f64 + 0.5),
                rect.min().y + dy * (row as f64 + 0.5),
            );
            if geometry.contains(&p) {
                centers.push(p);
            }
        }
    }
    centers
}

/// Degrees of longitude and latitude spanned by `meters` at a latitude
fn degree_offsets(meters: f64, latitude: f64) -> (f64, f64) {
    let dlat = meters / METERS_PER_DEGREE;
    let cos = latitude.to_radians().cos().abs().max(1e-6);
    (dlat / cos, dlat)
}

/// Circle of `radius_m` around a point, as a polygon
pub fn circle(center: Point<f64>, radius_m: f64) -> Polygon<f64> {
    let (rx, ry) = degree_offsets(radius_m, center.y());
    let ring: Vec<(f64, f64)> = (0..=CIRCLE_VERTICES)
        .map(|i| {
            let angle = TAU * i as f64 / CIRCLE_VERTICES as f64;
            (center.x() + rx * angle.cos(), center.y() + ry * angle.sin())
        })
        .collect();
    Polygon::new(LineString::from(ring), Vec::new())
}

/// Rectangle enclosing circles of `radius_m` around every center
fn envelope(centers: &[Point<f64>], radius_m: f64) -> Polygon<f64> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for c in centers {
        let (rx, ry) = degree_offsets(radius_m, c.y());
        min_x = min_x.min(c.x() - rx);
        max_x = max_x.max(c.x() + rx);
        min_y = min_y.min(c.y() - ry);
        max_y = max_y.max(c.y() + ry);
    }
    Polygon::new(
        LineString::from(vec![
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (min_x, min_y),
        ]),
        Vec::new(),
    )
}

/// `count` points spread evenly over a disc on a golden-angle spiral
///
/// The seed rotates the spiral.
pub fn spiral_points(center: Point<f64>, radius_m: f64, count: usize, seed: u64) -> Vec<Point<f64>> {
    let golden_angle = PI * (3.0 - 5f64.sqrt());
    let rotation = (seed as f64 * golden_angle) % TAU;
    let (rx, ry) = degree_offsets(radius_m, center.y());

    (0..count)
        .map(|i| {
            let r = ((i as f64 + 0.5) / count as f64).sqrt();
            let theta = rotation + i as f64 * golden_angle;
            Point::new(
                center.x() + rx * r * theta.cos(),
                center.y() + ry * r * theta.sin(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square() -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: -118.0, y: 34.0),
            (x: -117.0, y: 34.0),
            (x: -117.0, y: 35.0),
            (x: -118.0, y: 35.0),
            (x: -118.0, y: 34.0),
        ]])
    }

    #[test]
    fn test_centroid_plan() {
        let config = CollectorConfig {
            points_per_region: 50,
            ..Default::default()
        };
        let plan = plan(&square(), &config).unwrap();
        assert_eq!(plan.centers.len(), 1);
        assert!((plan.centers[0].x() + 117.5).abs() < 1e-9);
        assert!((plan.centers[0].y() - 34.5).abs() < 1e-9);
        assert_eq!(plan.points.len(), 50);
        // 10 km is about 0.09 degrees of latitude
        assert!(plan
            .points
            .iter()
            .all(|p| (p.y() - 34.5).abs() < 0.1 && (p.x() + 117.5).abs() < 0.2));
    }

    #[test]
    fn test_points_are_deterministic() {
        let config = CollectorConfig::default();
        let a = plan(&square(), &config).unwrap();
        let b = plan(&square(), &config).unwrap();
        assert_eq!(a.points, b.points);

        let other_seed = CollectorConfig {
            sample_seed: 7,
            ..Default::default()
        };
        assert_ne!(plan(&square(), &other_seed).unwrap().points, a.points);
    }

    #[test]
    fn test_points_stay_within_radius() {
        let center = Point::new(-100.0, 40.0);
        let (rx, ry) = degree_offsets(10_000.0, 40.0);
        for p in spiral_points(center, 10_000.0, 200, 42) {
            let nx = (p.x() - center.x()) / rx;
            let ny = (p.y() - center.y()) / ry;
            assert!(nx * nx + ny * ny <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_grid_plan() {
        let config = CollectorConfig {
            sample_grid: 3,
            points_per_region: 10,
            ..Default::default()
        };
        let plan = plan(&square(), &config).unwrap();
        assert_eq!(plan.centers.len(), 9);
        assert_eq!(plan.points.len(), 90);
        for c in &plan.centers {
            assert!(plan.region.contains(c));
        }
    }

    #[test]
    fn test_circle_is_closed() {
        let c = circle(Point::new(0.0, 0.0), 1_000.0);
        let ring = &c.exterior().0;
        assert_eq!(ring.first(), ring.last());
    }
}
