pub mod anim;
pub mod machine;
pub mod notify;
pub mod provider;
pub mod scene;
pub mod theme;

pub use anim::{Curve, Easing, Scheduler, Timing};
pub use machine::{ExplosionMenu, MenuEvent, MenuSession, Phase, SessionId};
pub use notify::SelectionNotifier;
pub use provider::{
    AccessoryVisual, ItemProvider, ItemVisual, SelectedItem, SelectionDelegate, Viewport,
};
pub use scene::{Label, Node, NodeId, NodeKind, Overlay};
pub use theme::ThemeColors;
