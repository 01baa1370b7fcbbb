use crate::error::{Error, Result};
use crate::geometry::Point;
use once_cell::sync::Lazy;
use regex::Regex;

// Unanchored at the end: the legacy tool read up to the first closing
// paren and ignored anything after it, including further transforms in
// a list.
static TRANSFORM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([a-zA-Z]+)\s*\(([^)]*)\)").unwrap());

/// A 2x3 affine matrix in SVG coefficient order:
/// x' = a*x + c*y + e, y' = b*x + d*y + f.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(x: f64, y: f64) -> Transform {
        Transform {
            e: x,
            f: y,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `angle` degrees about `(cx, cy)`, built by composing
    /// translate(cx, cy) * rotate(angle) * translate(-cx, -cy).
    pub fn rotate_about(angle: f64, cx: f64, cy: f64) -> Transform {
        let (sin, cos) = angle.to_radians().sin_cos();
        let rotation = Transform {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        };
        Transform::translate(cx, cy)
            .then(&rotation)
            .then(&Transform::translate(-cx, -cy))
    }

    /// Matrix product `self * other` (apply `other` first, then `self`).
    /// Only one transform level is resolved today, but the representation
    /// stays composable.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Parse an SVG `transform` attribute value.
///
/// Exactly three forms are handled: `rotate(angle, cx, cy)`,
/// `translate(x, y)` and `matrix(a, b, c, d, e, f)`. Arguments are split
/// on commas when any are present, else on whitespace. Any other
/// recognized keyword (`scale`, `skewX`, ...) yields `Ok(None)`: the
/// legacy tool ignored those transforms entirely, and that permissive
/// behavior is kept as policy rather than reported as an error.
pub fn parse_transform(text: &str) -> Result<Option<Transform>> {
    match parse_supported(text) {
        Ok(transform) => Ok(transform),
        Err(Error::UnsupportedTransform(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Strict form of [`parse_transform`]: an unsupported keyword surfaces as
/// [`Error::UnsupportedTransform`] instead of the treat-as-absent policy.
pub fn parse_supported(text: &str) -> Result<Option<Transform>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let Some(captures) = TRANSFORM_RE.captures(text) else {
        return Err(Error::InvalidAttributeValue {
            attribute: "transform".to_string(),
            value: text.to_string(),
        });
    };
    let keyword = captures.get(1).map_or("", |m| m.as_str());
    let args = transform_args(captures.get(2).map_or("", |m| m.as_str()), text)?;

    match keyword {
        "rotate" => {
            require_args(&args, 3, text)?;
            Ok(Some(Transform::rotate_about(args[0], args[1], args[2])))
        }
        "translate" => {
            require_args(&args, 2, text)?;
            Ok(Some(Transform::translate(args[0], args[1])))
        }
        "matrix" => {
            require_args(&args, 6, text)?;
            Ok(Some(Transform {
                a: args[0],
                b: args[1],
                c: args[2],
                d: args[3],
                e: args[4],
                f: args[5],
            }))
        }
        _ => Err(Error::UnsupportedTransform(keyword.to_string())),
    }
}

fn transform_args(args: &str, original: &str) -> Result<Vec<f64>> {
    let split: Vec<&str> = if args.contains(',') {
        args.split(',').collect()
    } else {
        args.split_whitespace().collect()
    };
    split
        .iter()
        .map(|token| {
            token.trim().parse::<f64>().map_err(|_| {
                Error::InvalidAttributeValue {
                    attribute: "transform".to_string(),
                    value: original.to_string(),
                }
            })
        })
        .collect()
}

fn require_args(args: &[f64], count: usize, original: &str) -> Result<()> {
    if args.len() == count {
        Ok(())
    } else {
        Err(Error::InvalidAttributeValue {
            attribute: "transform".to_string(),
            value: original.to_string(),
        })
    }
}

/// Resolve the transform for one element.
///
/// If the nearest parent element declares a `transform` attribute that
/// parses to a supported transform, it fully replaces the element's own
/// transform (override, not compose — the one-level inheritance rule of
/// the legacy tool). A parent transform with an unsupported keyword
/// falls back to the element's own; absent everything, identity.
pub fn resolve_transform(node: roxmltree::Node) -> Result<Transform> {
    if let Some(parent) = node.parent_element() {
        if let Some(parent_attr) = parent.attribute("transform") {
            if let Some(transform) = parse_transform(parent_attr)? {
                return Ok(transform);
            }
        }
    }
    match node.attribute("transform") {
        Some(attr) => Ok(parse_transform(attr)?.unwrap_or(Transform::IDENTITY)),
        None => Ok(Transform::IDENTITY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
            "expected ({x}, {y}), got ({}, {})",
            p.x,
            p.y
        );
    }

    #[test]
    fn parses_translate() {
        let t = parse_transform("translate(5, 7)").unwrap().unwrap();
        assert_close(t.apply(Point::new(1.0, 1.0)), 6.0, 8.0);
    }

    #[test]
    fn parses_whitespace_separated_arguments() {
        let t = parse_transform("translate(5 7)").unwrap().unwrap();
        assert_close(t.apply(Point::ZERO), 5.0, 7.0);
    }

    #[test]
    fn parses_matrix() {
        let t = parse_transform("matrix(1,0,0,1,10,20)").unwrap().unwrap();
        assert_close(t.apply(Point::new(2.0, 3.0)), 12.0, 23.0);
    }

    #[test]
    fn parses_rotate_about_center() {
        let t = parse_transform("rotate(90, 5, 5)").unwrap().unwrap();
        // Rotating the center is a fixed point; (10,5) goes a quarter turn.
        assert_close(t.apply(Point::new(5.0, 5.0)), 5.0, 5.0);
        assert_close(t.apply(Point::new(10.0, 5.0)), 5.0, 10.0);
    }

    #[test]
    fn unsupported_keyword_is_treated_as_absent() {
        assert!(parse_transform("scale(2,2)").unwrap().is_none());
        assert!(parse_transform("skewX(30)").unwrap().is_none());
    }

    #[test]
    fn strict_parse_surfaces_unsupported_keyword() {
        assert!(matches!(
            parse_supported("scale(2,2)"),
            Err(Error::UnsupportedTransform(_))
        ));
    }

    #[test]
    fn rejects_bad_arity_and_non_numeric_arguments() {
        assert!(matches!(
            parse_transform("rotate(45)"),
            Err(Error::InvalidAttributeValue { .. })
        ));
        assert!(matches!(
            parse_transform("translate(a, b)"),
            Err(Error::InvalidAttributeValue { .. })
        ));
        assert!(matches!(
            parse_transform("not a transform"),
            Err(Error::InvalidAttributeValue { .. })
        ));
    }

    #[test]
    fn only_the_first_transform_in_a_list_is_read() {
        let t = parse_transform("translate(5,7) rotate(30)").unwrap().unwrap();
        assert_close(t.apply(Point::ZERO), 5.0, 7.0);
    }

    #[test]
    fn composition_order_matches_svg() {
        let t = Transform::translate(10.0, 0.0)
            .then(&Transform::rotate_about(90.0, 0.0, 0.0));
        // Rotate first, then translate.
        assert_close(t.apply(Point::new(1.0, 0.0)), 10.0, 1.0);
    }

    #[test]
    fn parent_transform_overrides_child() {
        let doc = roxmltree::Document::parse(
            r#"<svg>
                 <g transform="translate(5,5)">
                   <rect transform="rotate(45,0,0)" width="1" height="1"/>
                 </g>
               </svg>"#,
        )
        .unwrap();
        let rect = doc
            .descendants()
            .find(|n| n.has_tag_name("rect"))
            .unwrap();
        let t = resolve_transform(rect).unwrap();
        assert_close(t.apply(Point::ZERO), 5.0, 5.0);
        assert_close(t.apply(Point::new(1.0, 0.0)), 6.0, 5.0);
    }

    #[test]
    fn unsupported_parent_falls_back_to_child() {
        let doc = roxmltree::Document::parse(
            r#"<svg>
                 <g transform="scale(2,2)">
                   <rect transform="translate(3,4)" width="1" height="1"/>
                 </g>
               </svg>"#,
        )
        .unwrap();
        let rect = doc
            .descendants()
            .find(|n| n.has_tag_name("rect"))
            .unwrap();
        let t = resolve_transform(rect).unwrap();
        assert_close(t.apply(Point::ZERO), 3.0, 4.0);
    }

    #[test]
    fn no_transform_anywhere_is_identity() {
        let doc = roxmltree::Document::parse(
            r#"<svg><rect width="1" height="1"/></svg>"#,
        )
        .unwrap();
        let rect = doc
            .descendants()
            .find(|n| n.has_tag_name("rect"))
            .unwrap();
        assert!(resolve_transform(rect).unwrap().is_identity());
    }
}
