use crate::path_data::{Outline, PathSeg};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Cross product of (b - a) and (p - a); sign gives which side of the
/// directed line a->b the point p lies on.
pub fn cross(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Flatten an outline to closed polygonal rings. Cubics are subdivided
/// until their control points sit within `tolerance` of the chord. Every
/// subpath is closed whether or not it carried an explicit close; the
/// union operates on filled regions, and a filled region has a closed
/// boundary. Rings do not repeat their first point.
pub fn flatten_outline(outline: &Outline, tolerance: f64) -> Vec<Vec<Point>> {
    let mut rings: Vec<Vec<Point>> = Vec::new();
    let mut ring: Vec<Point> = Vec::new();
    let mut current = Point::ZERO;

    let finish = |ring: &mut Vec<Point>, rings: &mut Vec<Vec<Point>>| {
        dedup_closing_point(ring);
        if ring.len() >= 3 {
            rings.push(std::mem::take(ring));
        } else {
            ring.clear();
        }
    };

    for seg in &outline.segments {
        match *seg {
            PathSeg::MoveTo(p) => {
                finish(&mut ring, &mut rings);
                ring.push(p);
                current = p;
            }
            PathSeg::LineTo(p) => {
                ring.push(p);
                current = p;
            }
            PathSeg::CurveTo {
                control1,
                control2,
                end,
            } => {
                flatten_cubic(current, control1, control2, end, tolerance, &mut ring);
                current = end;
            }
            PathSeg::Close => {
                let start = ring.first().copied();
                finish(&mut ring, &mut rings);
                if let Some(start) = start {
                    current = start;
                }
            }
        }
    }
    finish(&mut ring, &mut rings);
    rings
}

/// Drop a trailing point that coincides with the ring start; ring edges
/// are implicit between consecutive points and last->first.
fn dedup_closing_point(ring: &mut Vec<Point>) {
    while ring.len() > 1 {
        let first = ring[0];
        let last = ring[ring.len() - 1];
        if (first.x - last.x).abs() < 1e-12 && (first.y - last.y).abs() < 1e-12 {
            ring.pop();
        } else {
            break;
        }
    }
}

/// Adaptive de Casteljau subdivision. Pushes the flattened points after
/// `p0`, ending exactly on `p3`.
fn flatten_cubic(p0: Point, p1: Point, p2: Point, p3: Point, tolerance: f64, out: &mut Vec<Point>) {
    if cubic_is_flat(p0, p1, p2, p3, tolerance) {
        out.push(p3);
        return;
    }
    let mid = |a: Point, b: Point| Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    let ab = mid(p0, p1);
    let bc = mid(p1, p2);
    let cd = mid(p2, p3);
    let abc = mid(ab, bc);
    let bcd = mid(bc, cd);
    let split = mid(abc, bcd);
    flatten_cubic(p0, ab, abc, split, tolerance, out);
    flatten_cubic(split, bcd, cd, p3, tolerance, out);
}

fn cubic_is_flat(p0: Point, p1: Point, p2: Point, p3: Point, tolerance: f64) -> bool {
    let chord_x = p3.x - p0.x;
    let chord_y = p3.y - p0.y;
    let chord_len = chord_x.hypot(chord_y);
    if chord_len < 1e-12 {
        // Degenerate chord: fall back to control net size.
        let d1 = (p1.x - p0.x).hypot(p1.y - p0.y);
        let d2 = (p2.x - p0.x).hypot(p2.y - p0.y);
        return d1 <= tolerance && d2 <= tolerance;
    }
    let d1 = cross(p0, p3, p1).abs() / chord_len;
    let d2 = cross(p0, p3, p2).abs() / chord_len;
    d1 <= tolerance && d2 <= tolerance
}

/// Winding number of `p` with respect to a set of closed rings, using
/// the half-open crossing rule so points away from vertices are robust.
pub fn winding_number(p: Point, rings: &[Vec<Point>]) -> i32 {
    let mut winding = 0;
    for ring in rings {
        let n = ring.len();
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            if a.y <= p.y {
                if b.y > p.y && cross(a, b, p) > 0.0 {
                    winding += 1;
                }
            } else if b.y <= p.y && cross(a, b, p) < 0.0 {
                winding -= 1;
            }
        }
    }
    winding
}

/// Shoelace signed area; positive when the interior is on the left of
/// the traversal direction.
pub fn signed_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Total filled area of a set of consistently oriented rings (holes
/// carry negative signed area).
pub fn filled_area(rings: &[Vec<Point>]) -> f64 {
    rings.iter().map(|ring| signed_area(ring)).sum()
}

/// Axis-aligned bounds over all ring points, if any point exists.
pub fn bounds(rings: &[Vec<Point>]) -> Option<(Point, Point)> {
    let mut points = rings.iter().flatten();
    let first = *points.next()?;
    let mut min = first;
    let mut max = first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}
