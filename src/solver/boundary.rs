use crate::vec2::Vec2;

/// Fixed values returned for every coordinate outside the grid.
/// Also used as the ambient state written by `Grid::init`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inflow {
    pub density: f64,
    pub velocity: Vec2,
}

impl Default for Inflow {
    fn default() -> Self {
        Self {
            density: 30.0,
            velocity: Vec2::new(15.0, 0.0),
        }
    }
}

/// Inclusive axis-aligned cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl Rect {
    pub fn contains(&self, y: i64, x: i64) -> bool {
        self.x_min <= x && x <= self.x_max && self.y_min <= y && y <= self.y_max
    }

    pub fn is_inverted(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }
}

/// Two-outlet diffuser embedded in the flow.
/// Rows at or above `split_y` blow with `upper_velocity`, rows below with
/// `lower_velocity`. Vent cells carry zero density and never change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vent {
    pub rect: Rect,
    pub split_y: i64,
    pub upper_velocity: Vec2,
    pub lower_velocity: Vec2,
}

impl Default for Vent {
    fn default() -> Self {
        Self {
            rect: Rect {
                x_min: 10,
                x_max: 20,
                y_min: 40,
                y_max: 60,
            },
            split_y: 50,
            upper_velocity: Vec2::new(0.0, -10.0),
            lower_velocity: Vec2::new(0.0, 10.0),
        }
    }
}

impl Vent {
    pub fn contains(&self, y: i64, x: i64) -> bool {
        self.rect.contains(y, x)
    }

    /// Jet velocity for a row inside the vent.
    pub fn jet_velocity(&self, y: i64) -> Vec2 {
        if y <= self.split_y {
            self.upper_velocity
        } else {
            self.lower_velocity
        }
    }
}
