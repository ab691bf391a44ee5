//! Pointer and keyboard state

use std::collections::HashSet;
use winit::dpi::PhysicalSize;
use winit::keyboard::KeyCode;

/// Tracks the cursor and a handful of keys between frames.
///
/// Pointer events overwrite each other; only the latest position matters.
pub struct PointerState {
    /// Current cursor position in window pixels
    pub position: (f64, f64),
    /// Window size in pixels
    pub window_size: (u32, u32),
    /// Set when the cursor moved since the last [`PointerState::take_moved`]
    moved: bool,
    inside: bool,
    keys_down: HashSet<KeyCode>,
    keys_just_pressed: HashSet<KeyCode>,
}

impl PointerState {
    /// Pointer centred in a window of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: (width as f64 / 2.0, height as f64 / 2.0),
            window_size: (width, height),
            moved: false,
            inside: false,
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
        }
    }

    pub fn process_resize(&mut self, size: PhysicalSize<u32>) {
        self.window_size = (size.width, size.height);
    }

    /// Process cursor movement (window pixels)
    pub fn process_cursor_moved(&mut self, x: f64, y: f64) {
        self.position = (x, y);
        self.moved = true;
        self.inside = true;
    }

    pub fn process_cursor_left(&mut self) {
        self.inside = false;
    }

    pub fn process_key_down(&mut self, key: KeyCode) {
        if !self.keys_down.contains(&key) {
            self.keys_just_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    pub fn process_key_up(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
    }

    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Returns and clears the moved flag
    pub fn take_moved(&mut self) -> bool {
        std::mem::take(&mut self.moved)
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    /// Cursor position in normalized device coordinates, y up.
    ///
    /// Returns `None` while the window has no area.
    pub fn ndc(&self) -> Option<(f32, f32)> {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            return None;
        }
        let x = (self.position.0 / w as f64) * 2.0 - 1.0;
        let y = -(self.position.1 / h as f64) * 2.0 + 1.0;
        Some((x as f32, y as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_centred() {
        let p = PointerState::new(800, 600);
        assert_eq!(p.ndc(), Some((0.0, 0.0)));
        assert!(!p.is_inside());
    }

    #[test]
    fn test_ndc_corners() {
        let mut p = PointerState::new(800, 600);
        p.process_cursor_moved(0.0, 0.0);
        assert_eq!(p.ndc(), Some((-1.0, 1.0)));
        p.process_cursor_moved(800.0, 600.0);
        assert_eq!(p.ndc(), Some((1.0, -1.0)));
    }

    #[test]
    fn test_last_move_wins() {
        let mut p = PointerState::new(100, 100);
        p.process_cursor_moved(10.0, 10.0);
        p.process_cursor_moved(75.0, 25.0);
        assert!(p.take_moved());
        assert!(!p.take_moved());
        let (x, y) = p.ndc().unwrap();
        assert!((x - 0.5).abs() < 1e-6);
        assert!((y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_size_window() {
        let mut p = PointerState::new(800, 600);
        p.process_resize(PhysicalSize::new(0, 0));
        assert_eq!(p.ndc(), None);
    }

    #[test]
    fn test_key_transitions() {
        let mut p = PointerState::new(10, 10);
        p.process_key_down(KeyCode::Space);
        assert!(p.is_key_just_pressed(KeyCode::Space));
        p.end_frame();
        p.process_key_down(KeyCode::Space);
        assert!(!p.is_key_just_pressed(KeyCode::Space));
        p.process_key_up(KeyCode::Space);
        p.process_key_down(KeyCode::Space);
        assert!(p.is_key_just_pressed(KeyCode::Space));
    }
}
