//! The overlay container and the drawable nodes a session places in it.

use derive_more::{AsRef, Deref, Display, From, Into};
use orbit::geom::{Point, Rect, Size};
use palette::Srgba;
use serde::{Deserialize, Serialize};

use super::anim::{Animatable, Mutation, Property};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct NodeId(u64);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Label(String);

orbit::impl_string_newtype!(Label);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Backdrop,
    Highlight,
    AnchorClone,
    Item(usize),
    Accessory(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Unscaled size.
    pub size: Size,
    pub center: Point,
    pub scale: f64,
    pub opacity: f64,
    pub color: Srgba<f64>,
    pub label: Option<Label>,
}

impl Node {
    /// On-screen bounds with the current scale applied about the center.
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.center, self.size).scaled_about_center(self.scale)
    }
}

/// Everything needed to insert a node; the overlay assigns the id.
#[derive(Debug, Clone)]
pub struct NodeDraft {
    kind: NodeKind,
    size: Size,
    center: Point,
    scale: f64,
    opacity: f64,
    color: Srgba<f64>,
    label: Option<Label>,
}

impl NodeDraft {
    pub fn new(kind: NodeKind, size: Size, center: Point, color: Srgba<f64>) -> Self {
        Self {
            kind,
            size,
            center,
            scale: 1.0,
            opacity: 1.0,
            color,
            label: None,
        }
    }

    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    pub fn with_opacity(self, opacity: f64) -> Self {
        Self { opacity, ..self }
    }

    pub fn with_label(self, label: Option<Label>) -> Self {
        Self { label, ..self }
    }
}

/// Window-level container hosting a session's nodes. Insertion order is
/// stacking order, back to front.
#[derive(Debug)]
pub struct Overlay {
    bounds: Rect,
    nodes: Vec<Node>,
    next_id: u64,
}

impl Overlay {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            nodes: Vec::new(),
            next_id: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn insert(&mut self, draft: NodeDraft) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.push(Node {
            id,
            kind: draft.kind,
            size: draft.size,
            center: draft.center,
            scale: draft.scale,
            opacity: draft.opacity,
            color: draft.color,
            label: draft.label,
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(pos))
    }

    /// Back to front.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn items(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Item(_)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Animatable for Overlay {
    fn current(&self, node: NodeId, property: Property) -> Option<Mutation> {
        let node = self.get(node)?;
        Some(match property {
            Property::Scale => Mutation::Scale(node.scale),
            Property::Opacity => Mutation::Opacity(node.opacity),
            Property::Position => Mutation::Position(node.center),
        })
    }

    fn apply(&mut self, node: NodeId, value: Mutation) -> bool {
        let Some(node) = self.get_mut(node) else {
            return false;
        };
        match value {
            Mutation::Scale(scale) => node.scale = scale,
            Mutation::Opacity(opacity) => node.opacity = opacity,
            Mutation::Position(center) => node.center = center,
        }
        true
    }
}

/// Where an accessory sits: centered horizontally over the item, its
/// bottom edge `gap` above the item's top edge.
pub fn accessory_center(
    item_center: Point,
    item_size: Size,
    accessory_size: Size,
    gap: f64,
) -> Point {
    Point::new(
        item_center.x,
        item_center.y - item_size.height / 2.0 - gap - accessory_size.height / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white() -> Srgba<f64> {
        Srgba::new(1.0, 1.0, 1.0, 1.0)
    }

    #[test]
    fn test_insert_keeps_stacking_order() {
        let mut overlay = Overlay::new(Rect::new(Point::default(), Size::new(100.0, 100.0)));
        let back = overlay.insert(NodeDraft::new(
            NodeKind::Backdrop,
            Size::new(100.0, 100.0),
            Point::new(50.0, 50.0),
            white(),
        ));
        let item = overlay.insert(NodeDraft::new(
            NodeKind::Item(0),
            Size::square(10.0),
            Point::new(20.0, 20.0),
            white(),
        ));

        let order: Vec<NodeId> = overlay.nodes().map(|n| n.id).collect();
        assert_eq!(order, vec![back, item]);
        assert_eq!(overlay.items().count(), 1);

        assert!(overlay.remove(back).is_some());
        assert!(overlay.remove(back).is_none());
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_bounds_follow_scale() {
        let mut overlay = Overlay::new(Rect::default());
        let id = overlay.insert(
            NodeDraft::new(
                NodeKind::Item(0),
                Size::square(40.0),
                Point::new(0.0, 0.0),
                white(),
            )
            .with_scale(1.5),
        );
        let node = overlay.get(id).unwrap();
        assert_eq!(node.bounds().size, Size::square(60.0));
        assert!(node.bounds().contains(Point::new(29.0, 0.0)));
    }

    #[test]
    fn test_animatable_roundtrip() {
        let mut overlay = Overlay::new(Rect::default());
        let id = overlay.insert(
            NodeDraft::new(NodeKind::Highlight, Size::square(4.0), Point::default(), white())
                .with_opacity(0.0),
        );
        assert_eq!(
            overlay.current(id, Property::Opacity),
            Some(Mutation::Opacity(0.0))
        );
        assert!(overlay.apply(id, Mutation::Position(Point::new(3.0, 4.0))));
        assert_eq!(overlay.get(id).unwrap().center, Point::new(3.0, 4.0));
        overlay.remove(id);
        assert!(!overlay.apply(id, Mutation::Scale(2.0)));
    }

    #[test]
    fn test_accessory_sits_above_item() {
        let center = accessory_center(
            Point::new(100.0, 100.0),
            Size::square(44.0),
            Size::new(80.0, 20.0),
            8.0,
        );
        assert_eq!(center, Point::new(100.0, 60.0));
    }
}
