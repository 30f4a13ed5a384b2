pub mod geom;
pub mod layout;
pub mod macros;
pub mod touch;

pub use geom::{Point, Rect, Size};
pub use layout::{LayoutError, compute_item_points, compute_item_points_with_spread};
pub use touch::{TouchPhase, TouchSample};
