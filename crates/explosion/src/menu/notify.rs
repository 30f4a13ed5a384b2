use super::provider::{SelectedItem, SelectionDelegate};

/// Reports a session's selection to the delegate at most once.
#[derive(Debug, Default)]
pub struct SelectionNotifier {
    fired: bool,
}

impl SelectionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the delegate was called.
    pub fn notify<D: SelectionDelegate + ?Sized>(
        &mut self,
        delegate: &mut D,
        selected: Option<&SelectedItem>,
    ) -> bool {
        let Some(item) = selected else {
            return false;
        };
        if self.fired {
            log::warn!("selection of item {} already reported", item.index);
            return false;
        }
        self.fired = true;
        log::info!("selected item {}", item.index);
        delegate.on_select(item);
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
