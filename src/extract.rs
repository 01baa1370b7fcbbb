use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::path_data::{Outline, PathSeg, parse_path};
use crate::transform::{Transform, resolve_transform};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Walk the document and collect one `(Outline, Transform)` pair per
/// shape element, in document order within each kind and in the fixed
/// kind order path, rect, polygon. The ordering is semantically inert
/// (the union is commutative) but keeps the output string deterministic
/// across runs.
///
/// Shapes lacking geometry (`path` without `d`, `polygon` without
/// `points`) yield empty outlines and are skipped by the combiner; a
/// malformed attribute on any element fails the whole conversion.
pub fn extract_shapes(doc: &roxmltree::Document) -> Result<Vec<(Outline, Transform)>> {
    let root = doc.root_element();
    let mut shapes = Vec::new();
    extract_paths(root, &mut shapes)?;
    extract_rects(root, &mut shapes)?;
    extract_polygons(root, &mut shapes)?;
    Ok(shapes)
}

fn svg_descendants<'a, 'input>(
    root: roxmltree::Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    root.descendants()
        .filter(move |node| node.has_tag_name((SVG_NS, tag)))
}

fn extract_paths(
    root: roxmltree::Node,
    shapes: &mut Vec<(Outline, Transform)>,
) -> Result<()> {
    for node in svg_descendants(root, "path") {
        let outline = parse_path(attr_string(node, "d"))?;
        let transform = resolve_transform(node)?;
        shapes.push((outline, transform));
    }
    Ok(())
}

fn extract_rects(
    root: roxmltree::Node,
    shapes: &mut Vec<(Outline, Transform)>,
) -> Result<()> {
    for node in svg_descendants(root, "rect") {
        let x = attr_number(node, "x")?;
        let y = attr_number(node, "y")?;
        let width = attr_number(node, "width")?;
        let height = attr_number(node, "height")?;
        let outline = rect_outline(x, y, width, height);
        let transform = resolve_transform(node)?;
        shapes.push((outline, transform));
    }
    Ok(())
}

fn extract_polygons(
    root: roxmltree::Node,
    shapes: &mut Vec<(Outline, Transform)>,
) -> Result<()> {
    for node in svg_descendants(root, "polygon") {
        let points = attr_string(node, "points");
        // A polygon is a closed path: delegate to the path parser with a
        // synthesized d string so both go through the same grammar.
        let outline = if points.trim().is_empty() {
            Outline::new()
        } else {
            parse_path(&format!("M{points}Z"))?
        };
        let transform = resolve_transform(node)?;
        shapes.push((outline, transform));
    }
    Ok(())
}

fn rect_outline(x: f64, y: f64, width: f64, height: f64) -> Outline {
    let mut outline = Outline::new();
    outline.push(PathSeg::MoveTo(Point::new(x, y)));
    outline.push(PathSeg::LineTo(Point::new(x + width, y)));
    outline.push(PathSeg::LineTo(Point::new(x + width, y + height)));
    outline.push(PathSeg::LineTo(Point::new(x, y + height)));
    outline.push(PathSeg::Close);
    outline
}

/// Typed attribute accessor: missing or empty numeric attributes default
/// to 0, a non-numeric value is an error.
fn attr_number(node: roxmltree::Node, name: &str) -> Result<f64> {
    match node.attribute(name) {
        None => Ok(0.0),
        Some(value) if value.trim().is_empty() => Ok(0.0),
        Some(value) => value
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidAttributeValue {
                attribute: name.to_string(),
                value: value.to_string(),
            }),
    }
}

/// Typed attribute accessor: missing string attributes default to "".
fn attr_string<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::path_data::PathSeg;

    fn parse(doc: &str) -> roxmltree::Document<'_> {
        roxmltree::Document::parse(doc).unwrap()
    }

    fn corners(outline: &Outline) -> Vec<(f64, f64)> {
        outline
            .segments
            .iter()
            .filter_map(|seg| match *seg {
                PathSeg::MoveTo(p) | PathSeg::LineTo(p) => Some((p.x, p.y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn extracts_rect_corners() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                 <rect x="0" y="0" width="10" height="5"/>
               </svg>"#,
        );
        let shapes = extract_shapes(&doc).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(
            corners(&shapes[0].0),
            vec![(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (0.0, 5.0)]
        );
        assert!(shapes[0].1.is_identity());
    }

    #[test]
    fn missing_rect_attributes_default_to_zero() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="4" height="4"/></svg>"#,
        );
        let shapes = extract_shapes(&doc).unwrap();
        assert_eq!(corners(&shapes[0].0)[0], (0.0, 0.0));
    }

    #[test]
    fn non_numeric_rect_attribute_fails() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="wide" height="4"/></svg>"#,
        );
        assert!(matches!(
            extract_shapes(&doc),
            Err(Error::InvalidAttributeValue { .. })
        ));
    }

    #[test]
    fn polygon_matches_equivalent_path() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                 <polygon points="0,0 10,0 10,10 0,10"/>
               </svg>"#,
        );
        let shapes = extract_shapes(&doc).unwrap();
        let expected = parse_path("M0,0 10,0 10,10 0,10Z").unwrap();
        assert_eq!(shapes[0].0, expected);
    }

    #[test]
    fn shapes_without_geometry_yield_empty_outlines() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                 <path/>
                 <polygon/>
               </svg>"#,
        );
        let shapes = extract_shapes(&doc).unwrap();
        assert_eq!(shapes.len(), 2);
        assert!(shapes.iter().all(|(outline, _)| outline.is_empty()));
    }

    #[test]
    fn kinds_concatenate_in_fixed_order() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                 <polygon points="0,0 1,0 1,1"/>
                 <rect width="2" height="2"/>
                 <path d="M0,0 L3,3"/>
               </svg>"#,
        );
        let shapes = extract_shapes(&doc).unwrap();
        // path first, then rect, then polygon, regardless of document order.
        assert!(matches!(shapes[0].0.segments[1], PathSeg::LineTo(p) if p == Point::new(3.0, 3.0)));
        assert_eq!(corners(&shapes[1].0)[2], (2.0, 2.0));
        assert_eq!(corners(&shapes[2].0)[2], (1.0, 1.0));
    }

    #[test]
    fn ignores_elements_outside_the_svg_namespace() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:x="http://example.com/other">
                 <x:rect width="2" height="2"/>
               </svg>"#,
        );
        assert!(extract_shapes(&doc).unwrap().is_empty());
    }

    #[test]
    fn parent_transform_reaches_the_extracted_shape() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                 <g transform="translate(5,5)">
                   <rect transform="rotate(45,0,0)" width="10" height="5"/>
                 </g>
               </svg>"#,
        );
        let shapes = extract_shapes(&doc).unwrap();
        let p = shapes[0].1.apply(Point::ZERO);
        assert!((p.x - 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9);
        let q = shapes[0].1.apply(Point::new(1.0, 0.0));
        // Pure translate: the child's rotate must not have been composed.
        assert!((q.x - 6.0).abs() < 1e-9 && (q.y - 5.0).abs() < 1e-9);
    }
}
