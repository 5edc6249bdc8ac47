//! Occupancy cost grid.
//!
//! The host owns costmap construction; the controller only reads it. Costs
//! follow the usual layered-costmap convention: `0` is free space, values up
//! to [`MAX_NON_LETHAL`] grade proximity to obstacles, and everything from
//! [`INSCRIBED_INFLATED_OBSTACLE`] up is treated as a collision.

/// Cost of a cell known to be free.
pub const FREE_SPACE: u8 = 0;
/// Highest cost that still permits traversal.
pub const MAX_NON_LETHAL: u8 = 252;
/// Cost of a cell inside an obstacle's inscribed radius.
pub const INSCRIBED_INFLATED_OBSTACLE: u8 = 253;
/// Cost of a cell containing an obstacle.
pub const LETHAL_OBSTACLE: u8 = 254;
/// Cost of a cell with no sensor information.
pub const NO_INFORMATION: u8 = 255;

/// A dense, read-only 2-D cost grid in a fixed world frame.
///
/// # Example
///
/// ```
/// use control_types::{Costmap, LETHAL_OBSTACLE};
///
/// let mut map = Costmap::new(40, 40, 0.1, -2.0, -2.0, "odom");
/// map.set_cost(20, 20, LETHAL_OBSTACLE);
///
/// assert_eq!(map.cost_at_world(0.05, 0.05), Some(LETHAL_OBSTACLE));
/// assert_eq!(map.cost_at_world(-1.0, -1.0), Some(0));
/// assert_eq!(map.cost_at_world(100.0, 0.0), None);
/// ```
#[derive(Debug, Clone)]
pub struct Costmap {
    width: usize,
    height: usize,
    resolution: f64,
    origin_x: f64,
    origin_y: f64,
    frame_id: String,
    data: Vec<u8>,
}

impl Costmap {
    /// Create a free costmap of `width x height` cells.
    ///
    /// `origin_x`/`origin_y` is the world position of the grid's lower-left
    /// corner; `resolution` is the cell size in meters.
    #[must_use]
    pub fn new(
        width: usize,
        height: usize,
        resolution: f64,
        origin_x: f64,
        origin_y: f64,
        frame_id: impl Into<String>,
    ) -> Self {
        Self {
            width,
            height,
            resolution,
            origin_x,
            origin_y,
            frame_id: frame_id.into(),
            data: vec![FREE_SPACE; width * height],
        }
    }

    /// Fill the whole grid with one cost value.
    pub fn fill(&mut self, cost: u8) {
        self.data.fill(cost);
    }

    /// Frame the grid is expressed in.
    #[must_use]
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Cell size in meters.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Grid dimensions in cells.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Convert world coordinates to cell indices, if inside the grid.
    #[must_use]
    pub fn world_to_map(&self, wx: f64, wy: f64) -> Option<(usize, usize)> {
        if wx < self.origin_x || wy < self.origin_y {
            return None;
        }
        let mx = ((wx - self.origin_x) / self.resolution) as usize;
        let my = ((wy - self.origin_y) / self.resolution) as usize;
        (mx < self.width && my < self.height).then_some((mx, my))
    }

    /// Cost of the cell at `(mx, my)`.
    #[must_use]
    pub fn cost(&self, mx: usize, my: usize) -> u8 {
        self.data[my * self.width + mx]
    }

    /// Set the cost of the cell at `(mx, my)`.
    pub fn set_cost(&mut self, mx: usize, my: usize, cost: u8) {
        self.data[my * self.width + mx] = cost;
    }

    /// Cost at world coordinates; `None` when outside the grid.
    #[must_use]
    pub fn cost_at_world(&self, wx: f64, wy: f64) -> Option<u8> {
        self.world_to_map(wx, wy).map(|(mx, my)| self.cost(mx, my))
    }

    /// Whether a cost value is treated as a collision.
    #[must_use]
    pub fn is_lethal(cost: u8) -> bool {
        cost >= INSCRIBED_INFLATED_OBSTACLE
    }

    /// Mark a world-frame axis-aligned rectangle as lethal.
    ///
    /// Convenience for building test scenarios; cells outside the grid are
    /// ignored.
    pub fn mark_obstacle(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        let mut wy = min_y;
        while wy <= max_y {
            let mut wx = min_x;
            while wx <= max_x {
                if let Some((mx, my)) = self.world_to_map(wx, wy) {
                    self.set_cost(mx, my, LETHAL_OBSTACLE);
                }
                wx += self.resolution;
            }
            wy += self.resolution;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn world_to_map_bounds() {
        let map = Costmap::new(10, 20, 0.5, 1.0, 2.0, "map");

        assert_eq!(map.world_to_map(1.0, 2.0), Some((0, 0)));
        assert_eq!(map.world_to_map(5.9, 11.9), Some((9, 19)));
        assert_eq!(map.world_to_map(0.9, 2.0), None);
        assert_eq!(map.world_to_map(6.1, 2.0), None);
    }

    #[test]
    fn lethal_classification() {
        assert!(!Costmap::is_lethal(FREE_SPACE));
        assert!(!Costmap::is_lethal(MAX_NON_LETHAL));
        assert!(Costmap::is_lethal(INSCRIBED_INFLATED_OBSTACLE));
        assert!(Costmap::is_lethal(LETHAL_OBSTACLE));
        assert!(Costmap::is_lethal(NO_INFORMATION));
    }

    #[test]
    fn mark_obstacle_sets_cells() {
        let mut map = Costmap::new(20, 20, 0.1, 0.0, 0.0, "map");
        map.mark_obstacle(0.5, 0.5, 0.8, 0.8);

        assert_eq!(map.cost_at_world(0.6, 0.6), Some(LETHAL_OBSTACLE));
        assert_eq!(map.cost_at_world(0.2, 0.2), Some(FREE_SPACE));
    }
}
