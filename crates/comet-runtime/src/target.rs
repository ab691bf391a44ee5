//! Seek target: the picked anchor plus a small circular orbit

use comet_core::Vec3;
use std::f32::consts::TAU;

/// Moves the seek target around the anchor in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitTarget {
    /// Last picked point (also where the marker sphere is drawn)
    pub anchor: Vec3,
    /// Current orbit angle in radians
    pub angle: f32,
    /// Angle advance per frame
    pub step: f32,
    pub radius: f32,
}

impl Default for OrbitTarget {
    fn default() -> Self {
        Self::new(0.15, 0.5)
    }
}

impl OrbitTarget {
    pub fn new(step: f32, radius: f32) -> Self {
        Self {
            anchor: Vec3::ZERO,
            angle: 0.0,
            step,
            radius,
        }
    }

    pub fn set_anchor(&mut self, anchor: Vec3) {
        self.anchor = anchor;
    }

    /// Advance the angle by one frame. Once it reaches a full turn it snaps
    /// back to 0 instead of advancing.
    pub fn advance(&mut self) {
        if self.angle >= TAU {
            self.angle = 0.0;
        } else {
            self.angle += self.step;
        }
    }

    pub fn offset(&self) -> Vec3 {
        Vec3::new(self.angle.sin() * self.radius, 0.0, self.angle.cos() * self.radius)
    }

    /// Point the particles seek this frame
    pub fn target(&self) -> Vec3 {
        self.anchor + self.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_at_zero_angle() {
        let mut t = OrbitTarget::default();
        t.set_anchor(Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(t.target(), Vec3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn test_angle_wraps_after_full_turn() {
        let mut t = OrbitTarget::default();
        let mut wrapped_at = None;
        for frame in 1..200 {
            t.advance();
            if t.angle == 0.0 {
                wrapped_at = Some(frame);
                break;
            }
            assert!(t.angle < TAU + t.step);
        }
        // 42 advances pass 2π (42 * 0.15 = 6.3), the next one resets
        assert_eq!(wrapped_at, Some(43));
    }

    #[test]
    fn test_target_stays_on_orbit() {
        let mut t = OrbitTarget::new(0.15, 0.5);
        t.set_anchor(Vec3::new(-3.0, 1.0, 0.0));
        for _ in 0..100 {
            t.advance();
            let d = t.target().distance(&t.anchor);
            assert!((d - 0.5).abs() < 1e-5);
            assert_eq!(t.target().y, 1.0);
        }
    }
}
