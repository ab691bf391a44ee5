//! Fixed perspective camera looking down -Z at the swarm

use comet_core::{mat4_mul, Vec3};

/// A perspective camera. Depth maps to `[0, 1]` (near to far).
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Width / height
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 8.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            fov: 45.0,
            near: 1.0,
            far: 15000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera with the default placement for a window of the given size
    pub fn for_window(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_viewport(width, height);
        camera
    }

    /// Follow a window resize. Zero-sized windows keep the previous aspect.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn position_array(&self) -> [f32; 3] {
        self.position.to_array()
    }

    /// Get the view matrix (4x4, column-major)
    pub fn view_matrix(&self) -> [[f32; 4]; 4] {
        let f = (self.target - self.position).normalized();
        let s = f.cross(&self.up).normalized();
        let u = s.cross(&f);

        [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [
                -s.dot(&self.position),
                -u.dot(&self.position),
                f.dot(&self.position),
                1.0,
            ],
        ]
    }

    /// Get the projection matrix (4x4, column-major)
    pub fn projection_matrix(&self) -> [[f32; 4]; 4] {
        let f = 1.0 / (self.fov.to_radians() / 2.0).tan();
        // z_view = -near -> 0, z_view = -far -> 1
        let range = self.near - self.far;

        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, self.far / range, -1.0],
            [0.0, 0.0, self.near * self.far / range, 0.0],
        ]
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> [[f32; 4]; 4] {
        mat4_mul(&self.projection_matrix(), &self.view_matrix())
    }

    /// Get inverse of the combined view-projection matrix (for unprojecting)
    pub fn inverse_view_projection_matrix(&self) -> [[f32; 4]; 4] {
        mat4_inverse(&self.view_projection_matrix())
    }
}

/// Compute the inverse of a 4x4 column-major matrix using cofactor expansion
fn mat4_inverse(m: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
    // Flatten column-major to indexable
    let s = |col: usize, row: usize| -> f32 { m[col][row] };

    let c00 = s(2,2)*s(3,3) - s(3,2)*s(2,3);
    let c02 = s(1,2)*s(3,3) - s(3,2)*s(1,3);
    let c03 = s(1,2)*s(2,3) - s(2,2)*s(1,3);

    let c04 = s(2,1)*s(3,3) - s(3,1)*s(2,3);
    let c06 = s(1,1)*s(3,3) - s(3,1)*s(1,3);
    let c07 = s(1,1)*s(2,3) - s(2,1)*s(1,3);

    let c08 = s(2,1)*s(3,2) - s(3,1)*s(2,2);
    let c10 = s(1,1)*s(3,2) - s(3,1)*s(1,2);
    let c11 = s(1,1)*s(2,2) - s(2,1)*s(1,2);

    let c12 = s(2,0)*s(3,3) - s(3,0)*s(2,3);
    let c14 = s(1,0)*s(3,3) - s(3,0)*s(1,3);
    let c15 = s(1,0)*s(2,3) - s(2,0)*s(1,3);

    let c16 = s(2,0)*s(3,2) - s(3,0)*s(2,2);
    let c18 = s(1,0)*s(3,2) - s(3,0)*s(1,2);
    let c19 = s(1,0)*s(2,2) - s(2,0)*s(1,2);

    let c20 = s(2,0)*s(3,1) - s(3,0)*s(2,1);
    let c22 = s(1,0)*s(3,1) - s(3,0)*s(1,1);
    let c23 = s(1,0)*s(2,1) - s(2,0)*s(1,1);

    let f0 = [c00, c00, c02, c03];
    let f1 = [c04, c04, c06, c07];
    let f2 = [c08, c08, c10, c11];
    let f3 = [c12, c12, c14, c15];
    let f4 = [c16, c16, c18, c19];
    let f5 = [c20, c20, c22, c23];

    let v0 = [s(1,0), s(0,0), s(0,0), s(0,0)];
    let v1 = [s(1,1), s(0,1), s(0,1), s(0,1)];
    let v2 = [s(1,2), s(0,2), s(0,2), s(0,2)];
    let v3 = [s(1,3), s(0,3), s(0,3), s(0,3)];

    let mut inv = [[0.0f32; 4]; 4];
    let sign_a = [1.0, -1.0, 1.0, -1.0];
    let sign_b = [-1.0, 1.0, -1.0, 1.0];

    for i in 0..4 {
        inv[0][i] = sign_a[i] * (v1[i]*f0[i] - v2[i]*f1[i] + v3[i]*f2[i]);
        inv[1][i] = sign_b[i] * (v0[i]*f0[i] - v2[i]*f3[i] + v3[i]*f4[i]);
        inv[2][i] = sign_a[i] * (v0[i]*f1[i] - v1[i]*f3[i] + v3[i]*f5[i]);
        inv[3][i] = sign_b[i] * (v0[i]*f2[i] - v1[i]*f4[i] + v2[i]*f5[i]);
    }

    let det = s(0,0)*inv[0][0] + s(1,0)*inv[0][1] + s(2,0)*inv[0][2] + s(3,0)*inv[0][3];

    if det.abs() < 1e-10 {
        return [[1.0,0.0,0.0,0.0],[0.0,1.0,0.0,0.0],[0.0,0.0,1.0,0.0],[0.0,0.0,0.0,1.0]];
    }

    let inv_det = 1.0 / det;
    for col in &mut inv {
        for val in col.iter_mut() {
            *val *= inv_det;
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(m: &[[f32; 4]; 4], p: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|col| m[col][row] * p[col]).sum();
        }
        out
    }

    fn project(m: &[[f32; 4]; 4], p: Vec3) -> [f32; 3] {
        let c = transform(m, [p.x, p.y, p.z, 1.0]);
        [c[0] / c[3], c[1] / c[3], c[2] / c[3]]
    }

    #[test]
    fn test_defaults() {
        let cam = Camera::new();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 8.0));
        assert_eq!(cam.fov, 45.0);
        assert_eq!(cam.near, 1.0);
        assert_eq!(cam.far, 15000.0);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let cam = Camera::for_window(800, 600);
        let ndc = project(&cam.view_projection_matrix(), Vec3::ZERO);
        assert!(ndc[0].abs() < 1e-6);
        assert!(ndc[1].abs() < 1e-6);
        assert!(ndc[2] > 0.0 && ndc[2] < 1.0);
    }

    #[test]
    fn test_depth_range() {
        let cam = Camera::new();
        let vp = cam.view_projection_matrix();
        // camera at z = 8 looking down -Z
        let near = project(&vp, Vec3::new(0.0, 0.0, 7.0));
        let far = project(&vp, Vec3::new(0.0, 0.0, 8.0 - 15000.0));
        assert!(near[2].abs() < 1e-4);
        assert!((far[2] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_inverse_round_trip() {
        let cam = Camera::for_window(1280, 720);
        let vp = cam.view_projection_matrix();
        let inv = cam.inverse_view_projection_matrix();
        let product = mat4_mul(&inv, &vp);
        for (i, col) in product.iter().enumerate() {
            for (j, v) in col.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((v - expected).abs() < 1e-3, "[{i}][{j}] = {v}");
            }
        }
    }

    #[test]
    fn test_unproject_right_edge() {
        let cam = Camera::for_window(800, 800);
        let inv = cam.inverse_view_projection_matrix();
        let near = transform(&inv, [1.0, 0.0, 0.0, 1.0]);
        let near = Vec3::new(near[0] / near[3], near[1] / near[3], near[2] / near[3]);
        // right edge of the near plane at 45° fov
        let half = (22.5f32).to_radians().tan();
        assert!((near.x - half).abs() < 1e-3);
        assert!((near.z - 7.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_viewport_keeps_aspect() {
        let mut cam = Camera::for_window(400, 200);
        cam.set_viewport(0, 0);
        assert_eq!(cam.aspect, 2.0);
    }
}
