//! Collaborators the menu consumes: who supplies the items, where the
//! overlay lives, and who hears about a selection.

use orbit::geom::{Rect, Size};
use palette::Srgba;

use super::scene::{Label, Node};

#[derive(Debug, Clone, PartialEq)]
pub struct ItemVisual {
    pub size: Size,
    pub color: Srgba<f64>,
    pub label: Option<Label>,
}

/// Shown above the highlighted item.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessoryVisual {
    pub size: Size,
    pub color: Srgba<f64>,
    pub label: Option<Label>,
}

pub trait ItemProvider {
    fn item_count(&self) -> usize;
    fn item_visual(&self, index: usize) -> ItemVisual;
    fn accessory_visual(&self, index: usize) -> Option<AccessoryVisual>;
    fn radius(&self) -> f64;
}

pub trait Viewport {
    /// Bounds of the window-level container, or `None` when there is no
    /// window to host an overlay.
    fn root_bounds(&self) -> Option<Rect>;

    /// Frame of the anchor widget in the root container's coordinates.
    fn anchor_frame(&self) -> Rect;
}

/// The item chosen on release, as it looked when the exit began.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedItem {
    pub index: usize,
    pub node: Node,
}

pub trait SelectionDelegate {
    fn on_select(&mut self, item: &SelectedItem);
}
