//! Planar geometry helpers shared by the graph model and the navigators
//!
//! Coordinates are projected metres. Bearings are degrees counter-clockwise
//! from the positive x axis, normalised to `[0, 360)`.

use geo::{Contains, Coord, Intersects, Line, LineString, Point, Polygon};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};

/// Arc resolution used when approximating cones and circles with polygons
const ARC_STEPS: usize = 12;

/// Euclidean distance between two coordinates
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Midpoint of the segment `a`-`b`
pub fn midpoint(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}

/// Bearing from `from` towards `to`
pub fn bearing(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let degrees = (to.y - from.y).atan2(to.x - from.x).to_degrees();
    degrees.rem_euclid(360.0)
}

/// Absolute difference between two bearings, in `[0, 180]`
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Heading change when walking `from -> via -> to`: 0 straight on, 180 a U-turn
pub fn deflection(from: Coord<f64>, via: Coord<f64>, to: Coord<f64>) -> f64 {
    angle_difference(bearing(from, via), bearing(via, to))
}

/// Smallest circle enclosing two points, as `(centre, radius)`
pub fn enclosing_circle(a: Coord<f64>, b: Coord<f64>) -> (Coord<f64>, f64) {
    (midpoint(a, b), distance(a, b) / 2.0)
}

/// Point at `radius` from `origin` along `bearing_deg`
fn project(origin: Coord<f64>, bearing_deg: f64, radius: f64) -> Coord<f64> {
    let rad = bearing_deg.to_radians();
    Coord {
        x: origin.x + radius * rad.cos(),
        y: origin.y + radius * rad.sin(),
    }
}

/// Field-of-view cone from `apex` towards `target`
///
/// The cone opens `aperture` degrees around the apex-target axis and reaches
/// `radius` metres. The arc is approximated with straight segments.
pub fn view_field(apex: Coord<f64>, target: Coord<f64>, aperture: f64, radius: f64) -> Polygon<f64> {
    let axis = bearing(apex, target);
    let start = axis - aperture / 2.0;
    let step = aperture / ARC_STEPS as f64;

    let mut ring = Vec::with_capacity(ARC_STEPS + 3);
    ring.push(apex);
    for i in 0..=ARC_STEPS {
        ring.push(project(apex, start + step * i as f64, radius));
    }
    ring.push(apex);

    Polygon::new(LineString::new(ring), vec![])
}

/// Whether `point` lies inside or on the boundary of `polygon`
pub fn covers(polygon: &Polygon<f64>, point: Coord<f64>) -> bool {
    let p = Point::from(point);
    polygon.contains(&p) || polygon.exterior().intersects(&p)
}

/// Distance from `origin` to the nearest part of `line` lying inside `polygon`
///
/// Every segment of the line is cut where it crosses the polygon boundary;
/// pieces whose midpoint lies inside are measured point-to-segment. Returns
/// `None` when the line does not touch the polygon.
pub fn nearest_intersection_distance(
    origin: Coord<f64>,
    line: &LineString<f64>,
    polygon: &Polygon<f64>,
) -> Option<f64> {
    if !line.intersects(polygon) {
        return None;
    }

    let mut nearest: Option<f64> = None;
    for segment in line.lines() {
        for (a, b) in clip_to_polygon(segment, polygon) {
            let d = distance_to_segment(origin, a, b);
            if nearest.map_or(true, |n| d < n) {
                nearest = Some(d);
            }
        }
    }
    nearest
}

/// Pieces of `segment` inside or on `polygon`, as `(start, end)` pairs
///
/// A piece may collapse to a single point where the segment only grazes a
/// corner of the polygon.
fn clip_to_polygon(segment: Line<f64>, polygon: &Polygon<f64>) -> Vec<(Coord<f64>, Coord<f64>)> {
    let (a, b) = (segment.start, segment.end);
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    let at = |t: f64| Coord {
        x: a.x + t * dx,
        y: a.y + t * dy,
    };
    if len_sq == 0.0 {
        return if covers(polygon, a) { vec![(a, a)] } else { Vec::new() };
    }
    let param = |c: Coord<f64>| (((c.x - a.x) * dx + (c.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);

    let mut cuts = vec![0.0, 1.0];
    for side in polygon.exterior().lines() {
        match line_intersection(segment, side) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => cuts.push(param(intersection)),
            Some(LineIntersection::Collinear { intersection }) => {
                cuts.push(param(intersection.start));
                cuts.push(param(intersection.end));
            }
            None => {}
        }
    }
    cuts.sort_by(f64::total_cmp);
    cuts.dedup_by(|x, y| (*x - *y).abs() < 1e-12);

    let mut pieces = Vec::new();
    for pair in cuts.windows(2) {
        let (start, end) = (at(pair[0]), at(pair[1]));
        if covers(polygon, midpoint(start, end)) {
            pieces.push((start, end));
        }
    }
    // isolated touching points between two outside pieces
    for &t in &cuts {
        let point = at(t);
        if covers(polygon, point) && !pieces.iter().any(|&(s, e)| s == point || e == point) {
            pieces.push((point, point));
        }
    }
    pieces
}

/// Distance from `point` to the segment `a`-`b`
pub fn distance_to_segment(point: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(point, a);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(
        point,
        Coord {
            x: a.x + t * dx,
            y: a.y + t * dy,
        },
    )
}
