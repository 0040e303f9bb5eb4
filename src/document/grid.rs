//! Editing grid
//!
//! The grid defines the smallest step a dragged handle moves by.

/// Smallest and largest grid sizes reachable by halving/doubling
pub const MIN_GRID_SIZE: f32 = 0.125;
pub const MAX_GRID_SIZE: f32 = 1024.0;

/// Grid size and snapping toggle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    size: f32,
    snap: bool,
}

impl Grid {
    /// Snapping grid of the given size. Non-positive or non-finite sizes fall back to 1.
    pub fn new(size: f32) -> Self {
        let size = if size.is_finite() && size > 0.0 { size } else { 1.0 };
        Self { size, snap: true }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap
    }

    pub fn set_snap(&mut self, snap: bool) {
        self.snap = snap;
    }

    pub fn toggle_snap(&mut self) {
        self.snap = !self.snap;
    }

    /// Double the grid size (clamped)
    pub fn increase_size(&mut self) {
        self.size = (self.size * 2.0).min(MAX_GRID_SIZE);
    }

    /// Halve the grid size (clamped)
    pub fn decrease_size(&mut self) {
        self.size = (self.size / 2.0).max(MIN_GRID_SIZE);
    }

    /// Round a value to the nearest multiple of the grid size.
    /// Returns the value unchanged when snapping is off.
    pub fn snap(&self, value: f32) -> f32 {
        if !self.snap {
            return value;
        }
        snap_value(value, self.size)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Snap a single value to grid
pub fn snap_value(value: f32, grid_size: f32) -> f32 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_value() {
        assert!((snap_value(1.3, 1.0) - 1.0).abs() < 0.001);
        assert!((snap_value(1.6, 1.0) - 2.0).abs() < 0.001);
        assert!((snap_value(2.5, 1.0) - 3.0).abs() < 0.001); // Round half away from zero
        assert!((snap_value(-1.3, 1.0) - -1.0).abs() < 0.001);
        assert!((snap_value(-2.5, 1.0) - -3.0).abs() < 0.001);
    }

    #[test]
    fn test_grid_snap_toggle() {
        let mut grid = Grid::new(8.0);
        assert_eq!(grid.snap(11.0), 8.0);
        assert_eq!(grid.snap(13.0), 16.0);

        grid.toggle_snap();
        assert!(!grid.snap_enabled());
        assert_eq!(grid.snap(11.0), 11.0);
    }

    #[test]
    fn test_grid_size_steps() {
        let mut grid = Grid::new(1.0);
        grid.increase_size();
        assert_eq!(grid.size(), 2.0);
        grid.decrease_size();
        grid.decrease_size();
        assert_eq!(grid.size(), 0.5);

        for _ in 0..20 {
            grid.decrease_size();
        }
        assert_eq!(grid.size(), MIN_GRID_SIZE);
    }

    #[test]
    fn test_invalid_size_falls_back() {
        assert_eq!(Grid::new(0.0).size(), 1.0);
        assert_eq!(Grid::new(f32::NAN).size(), 1.0);
    }
}
