//! SVG path data interpreter.
//!
//! Turns a `d` attribute into absolute move/line/cubic/close segments.
//! Quadratics and elliptical arcs are converted to cubics. Unlike a
//! browser, which renders up to the first error, any syntax error here
//! fails the whole path.

use std::f64::consts::PI;

use crate::error::PathDataError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    Close,
}

/// Parse path data into absolute segments.
pub fn parse_path_data(d: &str) -> Result<Vec<Segment>, PathDataError> {
    let mut lex = Lexer::new(d);
    let mut segs = Vec::new();
    let mut cur = (0.0, 0.0);
    let mut start = (0.0, 0.0);
    // Reflection points for S/s and T/t
    let mut last_cubic_ctrl: Option<(f64, f64)> = None;
    let mut last_quad_ctrl: Option<(f64, f64)> = None;

    while let Some(cmd) = lex.command()? {
        if segs.is_empty() && !matches!(cmd, 'M' | 'm') {
            return Err(lex.error_at(lex.pos - 1, "path data must start with a moveto"));
        }
        let rel = cmd.is_ascii_lowercase();
        let origin = |cur: (f64, f64)| if rel { cur } else { (0.0, 0.0) };

        match cmd.to_ascii_uppercase() {
            'M' => {
                let (x, y) = lex.pair()?;
                let o = origin(cur);
                cur = (o.0 + x, o.1 + y);
                start = cur;
                segs.push(Segment::MoveTo(cur.0, cur.1));
                // Extra pairs after a moveto are implicit linetos.
                while lex.at_number() {
                    let (x, y) = lex.pair()?;
                    let o = origin(cur);
                    cur = (o.0 + x, o.1 + y);
                    segs.push(Segment::LineTo(cur.0, cur.1));
                }
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }
            'L' => {
                loop {
                    let (x, y) = lex.pair()?;
                    let o = origin(cur);
                    cur = (o.0 + x, o.1 + y);
                    segs.push(Segment::LineTo(cur.0, cur.1));
                    if !lex.at_number() {
                        break;
                    }
                }
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }
            'H' => {
                loop {
                    let x = lex.number()?;
                    cur.0 = if rel { cur.0 + x } else { x };
                    segs.push(Segment::LineTo(cur.0, cur.1));
                    if !lex.at_number() {
                        break;
                    }
                }
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }
            'V' => {
                loop {
                    let y = lex.number()?;
                    cur.1 = if rel { cur.1 + y } else { y };
                    segs.push(Segment::LineTo(cur.0, cur.1));
                    if !lex.at_number() {
                        break;
                    }
                }
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }
            'C' => loop {
                let o = origin(cur);
                let (x1, y1) = lex.pair()?;
                let (x2, y2) = lex.pair()?;
                let (x, y) = lex.pair()?;
                let (c1, c2) = ((o.0 + x1, o.1 + y1), (o.0 + x2, o.1 + y2));
                let end = (o.0 + x, o.1 + y);
                segs.push(Segment::CurveTo(c1.0, c1.1, c2.0, c2.1, end.0, end.1));
                cur = end;
                last_cubic_ctrl = Some(c2);
                last_quad_ctrl = None;
                if !lex.at_number() {
                    break;
                }
            },
            'S' => loop {
                let o = origin(cur);
                let (x2, y2) = lex.pair()?;
                let (x, y) = lex.pair()?;
                let c1 = reflect(cur, last_cubic_ctrl);
                let (c2, end) = ((o.0 + x2, o.1 + y2), (o.0 + x, o.1 + y));
                segs.push(Segment::CurveTo(c1.0, c1.1, c2.0, c2.1, end.0, end.1));
                cur = end;
                last_cubic_ctrl = Some(c2);
                last_quad_ctrl = None;
                if !lex.at_number() {
                    break;
                }
            },
            'Q' => loop {
                let o = origin(cur);
                let (qx, qy) = lex.pair()?;
                let (x, y) = lex.pair()?;
                let (q, end) = ((o.0 + qx, o.1 + qy), (o.0 + x, o.1 + y));
                let seg = quad_to_cubic(cur, q, end);
                segs.push(seg);
                cur = end;
                last_quad_ctrl = Some(q);
                last_cubic_ctrl = None;
                if !lex.at_number() {
                    break;
                }
            },
            'T' => loop {
                let o = origin(cur);
                let (x, y) = lex.pair()?;
                let q = reflect(cur, last_quad_ctrl);
                let end = (o.0 + x, o.1 + y);
                segs.push(quad_to_cubic(cur, q, end));
                cur = end;
                last_quad_ctrl = Some(q);
                last_cubic_ctrl = None;
                if !lex.at_number() {
                    break;
                }
            },
            'A' => loop {
                let o = origin(cur);
                let rx = lex.number()?;
                let ry = lex.number()?;
                let rotation = lex.number()?;
                let large_arc = lex.flag()?;
                let sweep = lex.flag()?;
                let (x, y) = lex.pair()?;
                let end = (o.0 + x, o.1 + y);
                arc_to_cubics(cur, rx, ry, rotation, large_arc, sweep, end, &mut segs);
                cur = end;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
                if !lex.at_number() {
                    break;
                }
            },
            'Z' => {
                segs.push(Segment::Close);
                cur = start;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }
            _ => {
                return Err(lex.error_at(lex.pos - 1, format!("unknown command '{cmd}'")));
            }
        }
    }

    Ok(segs)
}

fn reflect(cur: (f64, f64), ctrl: Option<(f64, f64)>) -> (f64, f64) {
    match ctrl {
        Some((cx, cy)) => (2.0 * cur.0 - cx, 2.0 * cur.1 - cy),
        None => cur,
    }
}

fn quad_to_cubic(p0: (f64, f64), q: (f64, f64), p1: (f64, f64)) -> Segment {
    let c1 = (p0.0 + 2.0 / 3.0 * (q.0 - p0.0), p0.1 + 2.0 / 3.0 * (q.1 - p0.1));
    let c2 = (p1.0 + 2.0 / 3.0 * (q.0 - p1.0), p1.1 + 2.0 / 3.0 * (q.1 - p1.1));
    Segment::CurveTo(c1.0, c1.1, c2.0, c2.1, p1.0, p1.1)
}

/// Elliptical arc to cubics via the SVG center parameterization.
#[allow(clippy::too_many_arguments)]
fn arc_to_cubics(
    p0: (f64, f64),
    rx: f64,
    ry: f64,
    rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
    p1: (f64, f64),
    out: &mut Vec<Segment>,
) {
    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if rx == 0.0 || ry == 0.0 {
        out.push(Segment::LineTo(p1.0, p1.1));
        return;
    }
    if p0 == p1 {
        return;
    }

    let phi = rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let dx2 = (p0.0 - p1.0) / 2.0;
    let dy2 = (p0.1 - p1.1) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Scale radii up when the endpoints are too far apart.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let (rx2, ry2) = (rx * rx, ry * ry);
    let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let coef = if den == 0.0 {
        0.0
    } else {
        let sign = if large_arc == sweep { -1.0 } else { 1.0 };
        sign * (num / den).max(0.0).sqrt()
    };
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-ry * x1p / rx);

    let cx = cos_phi * cxp - sin_phi * cyp + (p0.0 + p1.0) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (p0.1 + p1.1) / 2.0;

    let angle = |ux: f64, uy: f64, vx: f64, vy: f64| (ux * vy - uy * vx).atan2(ux * vx + uy * vy);
    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;

    let mut theta = angle(1.0, 0.0, ux, uy);
    let mut dtheta = angle(ux, uy, vx, vy);
    if !sweep && dtheta > 0.0 {
        dtheta -= 2.0 * PI;
    } else if sweep && dtheta < 0.0 {
        dtheta += 2.0 * PI;
    }

    // At most a quarter turn per cubic.
    let count = (dtheta.abs() / (PI / 2.0)).ceil().max(1.0) as usize;
    let delta = dtheta / count as f64;
    let k = 4.0 / 3.0 * (delta / 4.0).tan();

    let map = |x: f64, y: f64| {
        let (x, y) = (rx * x, ry * y);
        (cx + cos_phi * x - sin_phi * y, cy + sin_phi * x + cos_phi * y)
    };

    for i in 0..count {
        let t1 = theta;
        let t2 = theta + delta;
        let (s1, c1) = t1.sin_cos();
        let (s2, c2) = t2.sin_cos();
        let a = map(c1 - k * s1, s1 + k * c1);
        let b = map(c2 + k * s2, s2 - k * c2);
        // Land exactly on the requested endpoint.
        let end = if i + 1 == count { p1 } else { map(c2, s2) };
        out.push(Segment::CurveTo(a.0, a.1, b.0, b.1, end.0, end.1));
        theta = t2;
    }
}

// ─── Lexer ───────────────────────────────────────────────────────────

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Next command letter, `None` at end of input.
    fn command(&mut self) -> Result<Option<char>, PathDataError> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            None => Ok(None),
            Some(&b) if b.is_ascii_alphabetic() => {
                self.pos += 1;
                Ok(Some(b as char))
            }
            Some(_) => Err(self.error_at(self.pos, "expected a command letter")),
        }
    }

    fn at_number(&mut self) -> bool {
        self.skip_separators();
        matches!(
            self.bytes.get(self.pos),
            Some(b'0'..=b'9' | b'.' | b'+' | b'-')
        )
    }

    fn number(&mut self) -> Result<f64, PathDataError> {
        self.skip_separators();
        let start = self.pos;
        let mut digits = false;

        if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        digits |= self.digits();
        if self.bytes.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            digits |= self.digits();
        }
        if !digits {
            self.pos = start;
            return Err(self.error_at(start, "expected a number"));
        }
        if matches!(self.bytes.get(self.pos), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !self.digits() {
                // An `e` not followed by an exponent is not part of the number.
                self.pos = mark;
            }
        }

        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error_at(start, "malformed number"))
    }

    fn digits(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn pair(&mut self) -> Result<(f64, f64), PathDataError> {
        Ok((self.number()?, self.number()?))
    }

    /// Arc flags are a single `0` or `1` and may be written without separators.
    fn flag(&mut self) -> Result<bool, PathDataError> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(self.error_at(self.pos, "expected an arc flag (0 or 1)")),
        }
    }

    fn error_at(&self, offset: usize, reason: impl Into<String>) -> PathDataError {
        PathDataError {
            offset,
            reason: reason.into(),
        }
    }
}
