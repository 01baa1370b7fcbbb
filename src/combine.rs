use crate::config::Config;
use crate::error::Result;
use crate::extract::extract_shapes;
use crate::geometry::{self, Point};
use crate::path_data::{Outline, PathSeg, to_path_data};
use crate::transform::Transform;
use std::collections::{HashMap, HashSet};

/// The combined result: the unioned outline (nonzero fill rule) and its
/// serialized path-data string.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub outline: Outline,
    pub path_data: String,
}

/// Run the whole pipeline over one SVG document: parse the XML, extract
/// the shapes, union them, serialize. Malformed XML is fatal and
/// distinct from per-shape errors; a document with no convertible
/// geometry yields `Ok(None)` ("nothing to convert", not an error).
pub fn convert_document(svg_text: &str, config: &Config) -> Result<Option<Conversion>> {
    let doc = roxmltree::Document::parse(svg_text)?;
    let shapes = extract_shapes(&doc)?;
    let Some(outline) = combine(&shapes, config.flatten_tolerance) else {
        return Ok(None);
    };
    let path_data = to_path_data(&outline, config.precision);
    Ok(Some(Conversion { outline, path_data }))
}

/// Union a sequence of transformed outlines under the nonzero fill rule.
///
/// The union with an empty accumulator is the identity, so a single
/// shape passes through unchanged, cubics and all. Two or more shapes
/// are flattened and merged with a boundary-intersection plus
/// winding-number pass: split every boundary segment at its
/// intersections, keep the pieces that separate filled from unfilled
/// space, orient them with the filled region on the left and stitch
/// them back into rings.
pub fn combine(shapes: &[(Outline, Transform)], tolerance: f64) -> Option<Outline> {
    let mut outlines: Vec<Outline> = shapes
        .iter()
        .filter(|(outline, _)| !outline.is_empty())
        .map(|(outline, transform)| outline.transformed(transform))
        .collect();

    if outlines.len() <= 1 {
        return outlines.pop();
    }
    Some(union_outlines(&outlines, tolerance))
}

fn union_outlines(outlines: &[Outline], tolerance: f64) -> Outline {
    let mut rings: Vec<Vec<Point>> = Vec::new();
    for outline in outlines {
        rings.extend(geometry::flatten_outline(outline, tolerance));
    }
    let Some((min, max)) = geometry::bounds(&rings) else {
        return Outline::new();
    };
    let diag = (max.x - min.x).hypot(max.y - min.y).max(1.0);
    let sample_offset = diag * 1e-6;
    let merge_tolerance = diag * 1e-9;

    let edges = split_edges(&rings, merge_tolerance);
    let kept = keep_boundary_edges(&edges, &rings, sample_offset);
    let rings = stitch_rings(&kept, merge_tolerance);

    let mut outline = Outline::new();
    for ring in rings {
        let mut points = ring.into_iter();
        let Some(first) = points.next() else { continue };
        outline.push(PathSeg::MoveTo(first));
        for p in points {
            outline.push(PathSeg::LineTo(p));
        }
        outline.push(PathSeg::Close);
    }
    outline
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: Point,
    to: Point,
}

/// Collect every ring edge and split it at all intersections with the
/// other edges (including collinear overlaps, split at the projected
/// endpoints of the overlapping edge).
fn split_edges(rings: &[Vec<Point>], merge_tolerance: f64) -> Vec<Edge> {
    let mut raw: Vec<Edge> = Vec::new();
    for ring in rings {
        let n = ring.len();
        for i in 0..n {
            let from = ring[i];
            let to = ring[(i + 1) % n];
            if (from.x - to.x).abs() > merge_tolerance || (from.y - to.y).abs() > merge_tolerance
            {
                raw.push(Edge { from, to });
            }
        }
    }

    let mut split: Vec<Edge> = Vec::new();
    for (i, edge) in raw.iter().enumerate() {
        let mut params = vec![0.0_f64, 1.0];
        for (j, other) in raw.iter().enumerate() {
            if i == j {
                continue;
            }
            intersection_params(edge, other, &mut params);
        }
        params.sort_by(f64::total_cmp);
        params.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

        let r = Point::new(edge.to.x - edge.from.x, edge.to.y - edge.from.y);
        for pair in params.windows(2) {
            let from = point_at(edge.from, r, pair[0]);
            let to = point_at(edge.from, r, pair[1]);
            if (from.x - to.x).abs() > merge_tolerance || (from.y - to.y).abs() > merge_tolerance
            {
                split.push(Edge { from, to });
            }
        }
    }
    split
}

fn point_at(origin: Point, direction: Point, t: f64) -> Point {
    Point::new(origin.x + direction.x * t, origin.y + direction.y * t)
}

/// Push the parameters (along `edge`) where `other` crosses or overlaps
/// it. Parameters outside (0, 1) are irrelevant: the edge endpoints are
/// already split points.
fn intersection_params(edge: &Edge, other: &Edge, params: &mut Vec<f64>) {
    let r = Point::new(edge.to.x - edge.from.x, edge.to.y - edge.from.y);
    let s = Point::new(other.to.x - other.from.x, other.to.y - other.from.y);
    let qp = Point::new(other.from.x - edge.from.x, other.from.y - edge.from.y);
    let denom = r.x * s.y - r.y * s.x;
    let qp_cross_r = qp.x * r.y - qp.y * r.x;

    let r_len2 = r.x * r.x + r.y * r.y;
    if denom.abs() < 1e-12 * r_len2 {
        // Parallel. Collinear overlap splits at the other edge's endpoints.
        if qp_cross_r.abs() < 1e-9 * r_len2 {
            for p in [other.from, other.to] {
                let t = ((p.x - edge.from.x) * r.x + (p.y - edge.from.y) * r.y) / r_len2;
                if t > 1e-9 && t < 1.0 - 1e-9 {
                    params.push(t);
                }
            }
        }
        return;
    }

    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = qp_cross_r / denom;
    if t > 1e-9 && t < 1.0 - 1e-9 && (-1e-9..=1.0 + 1e-9).contains(&u) {
        params.push(t);
    }
}

/// Keep the sub-edges that separate filled from unfilled space under the
/// nonzero rule, oriented with the filled region on the left. The side
/// test samples the global winding number just off the edge midpoint.
fn keep_boundary_edges(edges: &[Edge], rings: &[Vec<Point>], sample_offset: f64) -> Vec<Edge> {
    let mut kept: Vec<Edge> = Vec::new();
    let mut seen: HashSet<(i64, i64, i64, i64)> = HashSet::new();
    let quantum = sample_offset / 100.0;

    for edge in edges {
        let dx = edge.to.x - edge.from.x;
        let dy = edge.to.y - edge.from.y;
        let len = dx.hypot(dy);
        if len <= 0.0 {
            continue;
        }
        let mid = Point::new(
            (edge.from.x + edge.to.x) / 2.0,
            (edge.from.y + edge.to.y) / 2.0,
        );
        let normal = Point::new(-dy / len, dx / len);
        let left = Point::new(
            mid.x + normal.x * sample_offset,
            mid.y + normal.y * sample_offset,
        );
        let right = Point::new(
            mid.x - normal.x * sample_offset,
            mid.y - normal.y * sample_offset,
        );
        let left_inside = geometry::winding_number(left, rings) != 0;
        let right_inside = geometry::winding_number(right, rings) != 0;
        if left_inside == right_inside {
            continue;
        }

        let oriented = if left_inside {
            *edge
        } else {
            Edge {
                from: edge.to,
                to: edge.from,
            }
        };
        let key = (
            quantize(oriented.from.x, quantum),
            quantize(oriented.from.y, quantum),
            quantize(oriented.to.x, quantum),
            quantize(oriented.to.y, quantum),
        );
        // Coincident boundary pieces contribute once.
        if seen.insert(key) {
            kept.push(oriented);
        }
    }
    kept
}

fn quantize(value: f64, quantum: f64) -> i64 {
    (value / quantum).round() as i64
}

/// Stitch directed edges into closed rings, taking the leftmost turn at
/// shared vertices so touching regions close into separate simple rings.
fn stitch_rings(edges: &[Edge], merge_tolerance: f64) -> Vec<Vec<Point>> {
    let quantum = merge_tolerance.max(1e-12) * 10.0;
    let mut by_start: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (idx, edge) in edges.iter().enumerate() {
        let key = (
            quantize(edge.from.x, quantum),
            quantize(edge.from.y, quantum),
        );
        by_start.entry(key).or_default().push(idx);
    }

    let mut used = vec![false; edges.len()];
    let mut rings: Vec<Vec<Point>> = Vec::new();

    for start_idx in 0..edges.len() {
        if used[start_idx] {
            continue;
        }
        let start_key = (
            quantize(edges[start_idx].from.x, quantum),
            quantize(edges[start_idx].from.y, quantum),
        );
        let mut ring = vec![edges[start_idx].from];
        used[start_idx] = true;
        let mut current = edges[start_idx];

        loop {
            let end_key = (
                quantize(current.to.x, quantum),
                quantize(current.to.y, quantum),
            );
            if end_key == start_key {
                if ring.len() >= 3 {
                    rings.push(ring);
                }
                break;
            }
            let din = Point::new(current.to.x - current.from.x, current.to.y - current.from.y);
            let next = by_start
                .get(&end_key)
                .into_iter()
                .flatten()
                .copied()
                .filter(|&idx| !used[idx])
                .max_by(|&a, &b| {
                    turn_angle(din, &edges[a]).total_cmp(&turn_angle(din, &edges[b]))
                });
            let Some(next_idx) = next else {
                // Dangling chain; drop it rather than emit a broken ring.
                break;
            };
            used[next_idx] = true;
            ring.push(edges[next_idx].from);
            current = edges[next_idx];
        }
    }
    rings
}

/// Counterclockwise turn angle from the incoming direction to the
/// candidate edge, with exact reversals ranked last.
fn turn_angle(din: Point, candidate: &Edge) -> f64 {
    let dout = Point::new(
        candidate.to.x - candidate.from.x,
        candidate.to.y - candidate.from.y,
    );
    let cross = din.x * dout.y - din.y * dout.x;
    let dot = din.x * dout.x + din.y * dout.y;
    let angle = cross.atan2(dot);
    if (angle - std::f64::consts::PI).abs() < 1e-9 {
        -std::f64::consts::PI
    } else {
        angle
    }
}
