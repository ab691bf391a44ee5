//! Cursor picking against an invisible plane
//!
//! Unprojects NDC coordinates through the camera's inverse view-projection
//! matrix and intersects the resulting ray with a bounded, double-sided plane.

use comet_core::Vec3;

/// A ray in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = if direction.length_squared() > 1e-16 {
            direction.normalized()
        } else {
            Vec3::FORWARD
        };
        Self { origin, direction }
    }

    /// Build a ray through NDC `(x, y)` from the near plane toward the far
    /// plane. `inv_view_proj` is column-major with depth mapped to `[0, 1]`.
    pub fn from_ndc(inv_view_proj: &[[f32; 4]; 4], ndc_x: f32, ndc_y: f32) -> Self {
        let near = unproject(inv_view_proj, [ndc_x, ndc_y, 0.0]);
        let far = unproject(inv_view_proj, [ndc_x, ndc_y, 1.0]);
        Self::new(near, far - near)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Transform a clip-space point by a 4x4 column-major matrix with
/// perspective divide.
pub fn unproject(m: &[[f32; 4]; 4], p: [f32; 3]) -> Vec3 {
    let x = m[0][0] * p[0] + m[1][0] * p[1] + m[2][0] * p[2] + m[3][0];
    let y = m[0][1] * p[0] + m[1][1] * p[1] + m[2][1] * p[2] + m[3][1];
    let z = m[0][2] * p[0] + m[1][2] * p[1] + m[2][2] * p[2] + m[3][2];
    let w = m[0][3] * p[0] + m[1][3] * p[1] + m[2][3] * p[2] + m[3][3];

    if w.abs() < 1e-10 {
        Vec3::new(x, y, z)
    } else {
        Vec3::new(x / w, y / w, z / w)
    }
}

/// Finite rectangle hit from either side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickPlane {
    pub center: Vec3,
    pub normal: Vec3,
    pub half_width: f32,
    pub half_height: f32,
}

impl PickPlane {
    /// Square plane of side `size` through the origin, facing +Z
    pub fn facing_camera(size: f32) -> Self {
        Self {
            center: Vec3::ZERO,
            normal: Vec3::new(0.0, 0.0, 1.0),
            half_width: size / 2.0,
            half_height: size / 2.0,
        }
    }

    /// In-plane (right, up) axes
    fn axes(&self) -> (Vec3, Vec3) {
        let n = self.normal.normalized();
        let mut right = Vec3::UP.cross(&n);
        if right.length_squared() < 1e-12 {
            right = Vec3::RIGHT;
        }
        let right = right.normalized();
        (right, n.cross(&right))
    }

    /// Nearest intersection in front of the ray origin, if it lands inside
    /// the rectangle.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let n = self.normal.normalized();
        let denom = ray.direction.dot(&n);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (self.center - ray.origin).dot(&n) / denom;
        if t < 0.0 {
            return None;
        }
        let hit = ray.at(t);
        let (right, up) = self.axes();
        let local = hit - self.center;
        if local.dot(&right).abs() <= self.half_width && local.dot(&up).abs() <= self.half_height {
            Some(hit)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_ray_hits_center() {
        let plane = PickPlane::facing_camera(20.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 8.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = plane.intersect(&ray).unwrap();
        assert!(hit.length() < 1e-6);
    }

    #[test]
    fn test_back_side_hits() {
        let plane = PickPlane::facing_camera(20.0);
        let ray = Ray::new(Vec3::new(1.0, 2.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = plane.intersect(&ray).unwrap();
        assert!((hit - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_misses() {
        let plane = PickPlane::facing_camera(20.0);
        // parallel
        assert!(plane
            .intersect(&Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::RIGHT))
            .is_none());
        // behind origin
        assert!(plane
            .intersect(&Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.0)))
            .is_none());
        // outside the rectangle
        assert!(plane
            .intersect(&Ray::new(Vec3::new(10.5, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0)))
            .is_none());
    }

    #[test]
    fn test_from_ndc_with_identity() {
        let identity = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let ray = Ray::from_ndc(&identity, 0.25, -0.5);
        assert_eq!(ray.origin, Vec3::new(0.25, -0.5, 0.0));
        assert_eq!(ray.direction, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_zero_direction_falls_back() {
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(ray.direction, Vec3::FORWARD);
    }
}
