//! Pure spline math: Catmull-Rom curves with arc-length sampling and
//! parallel-transport Frenet frames.
//!
//! Supports uniform, centripetal and chordal parameterisation over open or
//! closed control polygons. Sampling by `*_at(u)` walks the curve at constant
//! speed using a cached arc-length table.

use crate::error::{CometError, Result};
use crate::Vec3;

/// Number of chords used to approximate the curve length.
pub const ARC_LENGTH_DIVISIONS: usize = 200;

/// Step used for finite-difference tangents.
const TANGENT_DELTA: f32 = 0.0001;

/// Knot parameterisation for a Catmull-Rom curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveType {
    /// Knot spacing `|Δp|^0.5`; no cusps or self-intersections within a segment
    Centripetal,
    /// Knot spacing `|Δp|`
    Chordal,
    /// Uniform knots with the given tension (0.5 is the classic spline)
    Uniform { tension: f32 },
}

impl Default for CurveType {
    fn default() -> Self {
        CurveType::Centripetal
    }
}

/// Cubic Hermite polynomial for one coordinate of one segment.
#[derive(Debug, Clone, Copy)]
struct CubicPoly {
    c0: f32,
    c1: f32,
    c2: f32,
    c3: f32,
}

impl CubicPoly {
    /// Hermite form: value `x0`/`x1` and tangent `t0`/`t1` at the ends.
    fn hermite(x0: f32, x1: f32, t0: f32, t1: f32) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn uniform(x0: f32, x1: f32, x2: f32, x3: f32, tension: f32) -> Self {
        Self::hermite(x1, x2, tension * (x2 - x0), tension * (x3 - x1))
    }

    fn nonuniform(x0: f32, x1: f32, x2: f32, x3: f32, dt0: f32, dt1: f32, dt2: f32) -> Self {
        let mut t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
        let mut t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;
        // rescale tangents for parameter t in [0,1]
        t1 *= dt1;
        t2 *= dt1;
        Self::hermite(x1, x2, t1, t2)
    }

    fn calc(&self, t: f32) -> f32 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t3
    }
}

/// Rotate a vector around an axis by an angle in radians (Rodrigues' formula).
pub fn rotate_around_axis(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    let cos_a = angle.cos();
    let sin_a = angle.sin();
    let dot = v.dot(&axis);
    let cross = axis.cross(&v);
    Vec3::new(
        v.x * cos_a + cross.x * sin_a + axis.x * dot * (1.0 - cos_a),
        v.y * cos_a + cross.y * sin_a + axis.y * dot * (1.0 - cos_a),
        v.z * cos_a + cross.z * sin_a + axis.z * dot * (1.0 - cos_a),
    )
}

/// Orthonormal frames sampled along a curve.
///
/// Index `i` corresponds to arc-length parameter `i / segments`.
#[derive(Debug, Clone, Default)]
pub struct FrenetFrames {
    pub tangents: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub binormals: Vec<Vec3>,
}

impl FrenetFrames {
    pub fn len(&self) -> usize {
        self.tangents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tangents.is_empty()
    }
}

/// A Catmull-Rom curve through a list of control points.
#[derive(Debug, Clone)]
pub struct CatmullRomCurve {
    points: Vec<Vec3>,
    closed: bool,
    curve_type: CurveType,
    /// Cumulative chord lengths at `ARC_LENGTH_DIVISIONS + 1` even `t` steps
    arc_lengths: Vec<f32>,
}

impl CatmullRomCurve {
    /// Build a curve. Needs at least two control points.
    pub fn new(points: Vec<Vec3>, closed: bool, curve_type: CurveType) -> Result<Self> {
        if points.len() < 2 {
            return Err(CometError::config(format!(
                "a Catmull-Rom curve needs at least 2 control points, got {}",
                points.len()
            )));
        }
        let mut curve = Self {
            points,
            closed,
            curve_type,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.compute_arc_lengths(ARC_LENGTH_DIVISIONS);
        Ok(curve)
    }

    /// Open centripetal curve, the common case for trails
    pub fn centripetal(points: Vec<Vec3>) -> Result<Self> {
        Self::new(points, false, CurveType::Centripetal)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    /// Point at curve parameter `t` in [0, 1] (not arc-length uniform).
    pub fn point(&self, t: f32) -> Vec3 {
        let points = &self.points;
        let l = points.len() as isize;

        let p = (l - if self.closed { 0 } else { 1 }) as f32 * t;
        let mut int_point = p.floor() as isize;
        let mut weight = p - int_point as f32;

        if self.closed {
            if int_point <= 0 {
                int_point += (int_point.abs() / l + 1) * l;
            }
        } else if weight == 0.0 && int_point == l - 1 {
            int_point = l - 2;
            weight = 1.0;
        }

        let at = |i: isize| points[i.rem_euclid(l) as usize];

        // Open ends get phantom points reflected through the end points
        let p0 = if self.closed || int_point > 0 {
            at(int_point - 1)
        } else {
            points[0] - points[1] + points[0]
        };
        let p1 = at(int_point);
        let p2 = at(int_point + 1);
        let p3 = if self.closed || int_point + 2 < l {
            at(int_point + 2)
        } else {
            let last = points[(l - 1) as usize];
            last - points[(l - 2) as usize] + last
        };

        let (px, py, pz) = match self.curve_type {
            CurveType::Centripetal | CurveType::Chordal => {
                let pow = if self.curve_type == CurveType::Chordal {
                    0.5
                } else {
                    0.25
                };
                let mut dt0 = p0.distance_squared(&p1).powf(pow);
                let mut dt1 = p1.distance_squared(&p2).powf(pow);
                let mut dt2 = p2.distance_squared(&p3).powf(pow);

                // Coincident points would divide by zero
                if dt1 < 1e-4 {
                    dt1 = 1.0;
                }
                if dt0 < 1e-4 {
                    dt0 = dt1;
                }
                if dt2 < 1e-4 {
                    dt2 = dt1;
                }

                (
                    CubicPoly::nonuniform(p0.x, p1.x, p2.x, p3.x, dt0, dt1, dt2),
                    CubicPoly::nonuniform(p0.y, p1.y, p2.y, p3.y, dt0, dt1, dt2),
                    CubicPoly::nonuniform(p0.z, p1.z, p2.z, p3.z, dt0, dt1, dt2),
                )
            }
            CurveType::Uniform { tension } => (
                CubicPoly::uniform(p0.x, p1.x, p2.x, p3.x, tension),
                CubicPoly::uniform(p0.y, p1.y, p2.y, p3.y, tension),
                CubicPoly::uniform(p0.z, p1.z, p2.z, p3.z, tension),
            ),
        };

        Vec3::new(px.calc(weight), py.calc(weight), pz.calc(weight))
    }

    fn compute_arc_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        lengths.push(0.0);
        let mut last = self.point(0.0);
        let mut sum = 0.0_f32;
        for i in 1..=divisions {
            let current = self.point(i as f32 / divisions as f32);
            sum += current.distance(&last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }

    /// Approximate total length of the curve
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Map a normalized arc-length position `u` to the curve parameter `t`.
    pub fn u_to_t(&self, u: f32) -> f32 {
        let lengths = &self.arc_lengths;
        let n = lengths.len();
        let target = u.clamp(0.0, 1.0) * lengths[n - 1];

        // Binary search for the largest index whose length is <= target
        let mut low: isize = 0;
        let mut high: isize = n as isize - 1;
        while low <= high {
            let i = low + (high - low) / 2;
            let comparison = lengths[i as usize] - target;
            if comparison < 0.0 {
                low = i + 1;
            } else if comparison > 0.0 {
                high = i - 1;
            } else {
                high = i;
                break;
            }
        }

        let i = high.max(0) as usize;
        let last = (n - 1) as f32;
        if lengths[i] == target || i >= n - 1 {
            return i as f32 / last;
        }

        let before = lengths[i];
        let segment = lengths[i + 1] - before;
        if segment <= 0.0 {
            return i as f32 / last;
        }
        let fraction = (target - before) / segment;
        (i as f32 + fraction) / last
    }

    /// Point at normalized arc-length position `u`
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at curve parameter `t` (zero for a degenerate curve)
    pub fn tangent(&self, t: f32) -> Vec3 {
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalized()
    }

    /// Unit tangent at normalized arc-length position `u`
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }

    /// Parallel-transport frames at `segments + 1` evenly spaced arc-length
    /// positions.
    ///
    /// The first normal is seeded perpendicular to the tangent's smallest
    /// component; each following frame rotates the previous one by the turn
    /// between consecutive tangents, so the tube never twists about itself.
    pub fn frenet_frames(&self, segments: usize) -> FrenetFrames {
        let count = segments + 1;
        let mut tangents = Vec::with_capacity(count);
        let mut normals = Vec::with_capacity(count);
        let mut binormals = Vec::with_capacity(count);

        for i in 0..count {
            let u = if segments == 0 { 0.0 } else { i as f32 / segments as f32 };
            tangents.push(self.tangent_at(u));
        }

        let t0 = tangents[0];
        let (tx, ty, tz) = (t0.x.abs(), t0.y.abs(), t0.z.abs());
        let mut min = f32::MAX;
        let mut seed = Vec3::ZERO;
        if tx <= min {
            min = tx;
            seed = Vec3::new(1.0, 0.0, 0.0);
        }
        if ty <= min {
            min = ty;
            seed = Vec3::new(0.0, 1.0, 0.0);
        }
        if tz <= min {
            seed = Vec3::new(0.0, 0.0, 1.0);
        }

        let side = t0.cross(&seed).normalized();
        let n0 = t0.cross(&side);
        normals.push(n0);
        binormals.push(t0.cross(&n0));

        for i in 1..count {
            let mut normal = normals[i - 1];
            let axis = tangents[i - 1].cross(&tangents[i]);
            if axis.length() > f32::EPSILON {
                let axis = axis.normalized();
                let theta = tangents[i - 1].dot(&tangents[i]).clamp(-1.0, 1.0).acos();
                normal = rotate_around_axis(normal, axis, theta);
            }
            normals.push(normal);
            binormals.push(tangents[i].cross(&normal));
        }

        if self.closed && segments > 0 {
            let mut theta = normals[0].dot(&normals[segments]).clamp(-1.0, 1.0).acos();
            theta /= segments as f32;
            if tangents[0].dot(&normals[0].cross(&normals[segments])) > 0.0 {
                theta = -theta;
            }
            for i in 1..count {
                normals[i] = rotate_around_axis(normals[i], tangents[i], theta * i as f32);
                binormals[i] = tangents[i].cross(&normals[i]);
            }
        }

        FrenetFrames {
            tangents,
            normals,
            binormals,
        }
    }
}
