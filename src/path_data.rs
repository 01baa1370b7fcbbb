use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::transform::Transform;

/// One segment of an outline. Coordinates are always absolute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSeg {
    MoveTo(Point),
    LineTo(Point),
    CurveTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
    Close,
}

/// An ordered sequence of path segments. A well-formed outline starts
/// with `MoveTo`; `Close` returns the current point to the most recent
/// `MoveTo` point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub segments: Vec<PathSeg>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, seg: PathSeg) {
        self.segments.push(seg);
    }

    /// Apply an affine transform to every coordinate, control points included.
    pub fn transformed(&self, transform: &Transform) -> Outline {
        let segments = self
            .segments
            .iter()
            .map(|seg| match *seg {
                PathSeg::MoveTo(p) => PathSeg::MoveTo(transform.apply(p)),
                PathSeg::LineTo(p) => PathSeg::LineTo(transform.apply(p)),
                PathSeg::CurveTo {
                    control1,
                    control2,
                    end,
                } => PathSeg::CurveTo {
                    control1: transform.apply(control1),
                    control2: transform.apply(control2),
                    end: transform.apply(end),
                },
                PathSeg::Close => PathSeg::Close,
            })
            .collect();
        Outline { segments }
    }
}

struct PathScanner<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> PathScanner<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            data: data.as_bytes(),
            index: 0,
        }
    }

    fn current(&self) -> Option<u8> {
        self.data.get(self.index).copied()
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn at_end(&self) -> bool {
        self.index >= self.data.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(c) if c.is_ascii_whitespace()) {
            self.advance();
        }
    }

    /// Skip whitespace with at most one comma, the separator rule of the
    /// path grammar.
    fn skip_wsp_comma(&mut self) {
        self.skip_whitespace();
        if self.current() == Some(b',') {
            self.advance();
            self.skip_whitespace();
        }
    }

    /// True when the cursor sits on the start of a number (a new
    /// coordinate group under implicit command repetition).
    fn at_number(&self) -> bool {
        matches!(self.current(), Some(c) if c.is_ascii_digit() || c == b'+' || c == b'-' || c == b'.')
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_wsp_comma();
        let start = self.index;
        if matches!(self.current(), Some(b'+') | Some(b'-')) {
            self.advance();
        }
        while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.current() == Some(b'.') {
            self.advance();
            while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.current(), Some(b'e') | Some(b'E')) {
            self.advance();
            if matches!(self.current(), Some(b'+') | Some(b'-')) {
                self.advance();
            }
            while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.data[start..self.index]).unwrap_or("");
        text.parse::<f64>().map_err(|_| {
            Error::MalformedPathData(format!("expected number at offset {}", start))
        })
    }
}

/// Parse an SVG path `d` string into an [`Outline`].
///
/// Supports `M L H V C Q A Z` and their lowercase relative forms, with
/// implicit repetition of the previous command when a coordinate group
/// follows without a letter. `Q` is degree-elevated to a cubic and `A`
/// is converted to cubic segments, so the resulting outline only carries
/// move/line/cubic/close segments. Any other command letter fails with
/// [`Error::MalformedPathData`].
pub fn parse_path(d: &str) -> Result<Outline> {
    let mut scanner = PathScanner::new(d);
    let mut outline = Outline::new();
    let mut command: Option<u8> = None;
    let mut current = Point::ZERO;
    let mut subpath_start = Point::ZERO;

    loop {
        scanner.skip_wsp_comma();
        if scanner.at_end() {
            break;
        }
        let c = scanner.current().unwrap_or(0);
        if c.is_ascii_alphabetic() {
            match c {
                b'M' | b'm' | b'L' | b'l' | b'H' | b'h' | b'V' | b'v' | b'C' | b'c' | b'Q'
                | b'q' | b'A' | b'a' | b'Z' | b'z' => {
                    scanner.advance();
                    command = Some(c);
                }
                _ => {
                    return Err(Error::MalformedPathData(format!(
                        "unsupported path command '{}'",
                        c as char
                    )));
                }
            }
        } else if !scanner.at_number() {
            return Err(Error::MalformedPathData(format!(
                "unexpected character '{}' in path data",
                c as char
            )));
        }

        let Some(cmd) = command else {
            return Err(Error::MalformedPathData(
                "coordinate group without a preceding command".to_string(),
            ));
        };
        let relative = cmd.is_ascii_lowercase();

        match cmd.to_ascii_uppercase() {
            b'M' => {
                let p = read_pair(&mut scanner, relative, current)?;
                current = p;
                subpath_start = p;
                outline.push(PathSeg::MoveTo(p));
                // Subsequent coordinate groups are implicit line-tos.
                command = Some(if relative { b'l' } else { b'L' });
            }
            b'L' => {
                let p = read_pair(&mut scanner, relative, current)?;
                current = p;
                outline.push(PathSeg::LineTo(p));
            }
            b'H' => {
                let x = scanner.number()?;
                let x = if relative { current.x + x } else { x };
                current = Point::new(x, current.y);
                outline.push(PathSeg::LineTo(current));
            }
            b'V' => {
                let y = scanner.number()?;
                let y = if relative { current.y + y } else { y };
                current = Point::new(current.x, y);
                outline.push(PathSeg::LineTo(current));
            }
            b'C' => {
                let control1 = read_pair(&mut scanner, relative, current)?;
                let control2 = read_pair(&mut scanner, relative, current)?;
                let end = read_pair(&mut scanner, relative, current)?;
                outline.push(PathSeg::CurveTo {
                    control1,
                    control2,
                    end,
                });
                current = end;
            }
            b'Q' => {
                let control = read_pair(&mut scanner, relative, current)?;
                let end = read_pair(&mut scanner, relative, current)?;
                outline.push(elevate_quadratic(current, control, end));
                current = end;
            }
            b'A' => {
                let rx = scanner.number()?;
                let ry = scanner.number()?;
                let x_rotation = scanner.number()?;
                let large_arc = read_flag(&mut scanner)?;
                let sweep = read_flag(&mut scanner)?;
                let end = read_pair(&mut scanner, relative, current)?;
                arc_to_cubics(
                    current, rx, ry, x_rotation, large_arc, sweep, end, &mut outline,
                );
                current = end;
            }
            b'Z' => {
                outline.push(PathSeg::Close);
                current = subpath_start;
                // Numbers may not follow a close without a new command.
                command = None;
            }
            _ => unreachable!(),
        }
    }

    Ok(outline)
}

fn read_pair(scanner: &mut PathScanner, relative: bool, current: Point) -> Result<Point> {
    let x = scanner.number()?;
    let y = scanner.number()?;
    if relative {
        Ok(Point::new(current.x + x, current.y + y))
    } else {
        Ok(Point::new(x, y))
    }
}

fn read_flag(scanner: &mut PathScanner) -> Result<bool> {
    let value = scanner.number()?;
    match value {
        v if v == 0.0 => Ok(false),
        v if v == 1.0 => Ok(true),
        v => Err(Error::MalformedPathData(format!(
            "arc flag must be 0 or 1, got {v}"
        ))),
    }
}

/// Degree-elevate a quadratic segment to the cubic the outline model carries.
fn elevate_quadratic(from: Point, control: Point, end: Point) -> PathSeg {
    let control1 = Point::new(
        from.x + 2.0 / 3.0 * (control.x - from.x),
        from.y + 2.0 / 3.0 * (control.y - from.y),
    );
    let control2 = Point::new(
        end.x + 2.0 / 3.0 * (control.x - end.x),
        end.y + 2.0 / 3.0 * (control.y - end.y),
    );
    PathSeg::CurveTo {
        control1,
        control2,
        end,
    }
}

/// Convert an elliptical arc to cubic segments using the endpoint to
/// center parameterization from the SVG spec, splitting at 90 degrees
/// per cubic.
#[allow(clippy::too_many_arguments)]
fn arc_to_cubics(
    from: Point,
    rx: f64,
    ry: f64,
    x_rotation: f64,
    large_arc: bool,
    sweep: bool,
    to: Point,
    outline: &mut Outline,
) {
    if from == to {
        return;
    }
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx == 0.0 || ry == 0.0 {
        outline.push(PathSeg::LineTo(to));
        return;
    }

    let phi = x_rotation.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let dx2 = (from.x - to.x) / 2.0;
    let dy2 = (from.y - to.y) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Scale radii up if the endpoints cannot be reached.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let num = (rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p).max(0.0);
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let mut coef = if den == 0.0 { 0.0 } else { (num / den).sqrt() };
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;

    let cx = cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0;

    let theta1 = ((y1p - cyp) / ry).atan2((x1p - cxp) / rx);
    let theta2 = ((-y1p - cyp) / ry).atan2((-x1p - cxp) / rx);
    let mut delta = theta2 - theta1;
    if sweep && delta < 0.0 {
        delta += 2.0 * std::f64::consts::PI;
    } else if !sweep && delta > 0.0 {
        delta -= 2.0 * std::f64::consts::PI;
    }

    let segments = (delta.abs() / std::f64::consts::FRAC_PI_2).ceil().max(1.0) as usize;
    let step = delta / segments as f64;
    let ellipse_point = |theta: f64| -> Point {
        let (sin_t, cos_t) = theta.sin_cos();
        Point::new(
            cx + rx * cos_t * cos_phi - ry * sin_t * sin_phi,
            cy + rx * cos_t * sin_phi + ry * sin_t * cos_phi,
        )
    };
    let ellipse_derivative = |theta: f64| -> Point {
        let (sin_t, cos_t) = theta.sin_cos();
        Point::new(
            -rx * sin_t * cos_phi - ry * cos_t * sin_phi,
            -rx * sin_t * sin_phi + ry * cos_t * cos_phi,
        )
    };

    let alpha = 4.0 / 3.0 * (step / 4.0).tan();
    let mut theta = theta1;
    let mut start = ellipse_point(theta);
    for i in 0..segments {
        let next = theta + step;
        // Last segment ends exactly on the arc's endpoint.
        let end = if i == segments - 1 {
            to
        } else {
            ellipse_point(next)
        };
        let d1 = ellipse_derivative(theta);
        let d2 = ellipse_derivative(next);
        outline.push(PathSeg::CurveTo {
            control1: Point::new(start.x + alpha * d1.x, start.y + alpha * d1.y),
            control2: Point::new(end.x - alpha * d2.x, end.y - alpha * d2.y),
            end,
        });
        theta = next;
        start = end;
    }
}

/// Serialize an outline to a compact absolute `M/L/C/Z` path-data string.
pub fn to_path_data(outline: &Outline, precision: usize) -> String {
    let mut d = String::new();
    for seg in &outline.segments {
        match *seg {
            PathSeg::MoveTo(p) => {
                push_command(&mut d, 'M');
                push_point(&mut d, p, precision);
            }
            PathSeg::LineTo(p) => {
                push_command(&mut d, 'L');
                push_point(&mut d, p, precision);
            }
            PathSeg::CurveTo {
                control1,
                control2,
                end,
            } => {
                push_command(&mut d, 'C');
                push_point(&mut d, control1, precision);
                d.push(' ');
                push_point(&mut d, control2, precision);
                d.push(' ');
                push_point(&mut d, end, precision);
            }
            PathSeg::Close => {
                if !d.is_empty() {
                    d.push(' ');
                }
                d.push('Z');
            }
        }
    }
    d
}

fn push_command(d: &mut String, command: char) {
    if !d.is_empty() {
        d.push(' ');
    }
    d.push(command);
}

fn push_point(d: &mut String, p: Point, precision: usize) {
    d.push_str(&fmt_coord(p.x, precision));
    d.push(',');
    d.push_str(&fmt_coord(p.y, precision));
}

/// Fixed-precision formatting with trailing zeros trimmed.
fn fmt_coord(value: f64, precision: usize) -> String {
    let mut text = format!("{value:.precision$}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}
