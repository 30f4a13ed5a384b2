//! Headless host: owns the menu and feeds it events on one thread.

use crate::config::{self, Config, ItemConfig};
use crate::events::AppEvent;
use crate::gesture::PressRecognizer;
use crate::menu::theme::{self, ThemeColors};
use crate::menu::{
    AccessoryVisual, ExplosionMenu, ItemProvider, ItemVisual, Label, Phase, SelectedItem,
    SelectionDelegate, Viewport,
};
use orbit::geom::{Rect, Size};
use palette::Srgba;
use std::time::Duration;

/// Items described in the configuration file.
#[derive(Debug, Clone)]
pub struct ConfiguredItems {
    items: Vec<ItemConfig>,
    radius: f64,
    item_size: Size,
    accessory_size: Size,
    colors: ThemeColors,
}

impl ConfiguredItems {
    pub fn from_config(config: &Config) -> Self {
        Self {
            items: config.items.clone(),
            radius: config.menu.radius,
            item_size: Size::square(config.menu.item_size),
            accessory_size: config.menu.accessory_size(),
            colors: ThemeColors::from_config(&config.theme),
        }
    }

    fn item_color(&self, item: &ItemConfig) -> Srgba<f64> {
        item.color
            .as_deref()
            .and_then(|hex| match theme::parse_hex(hex, 1.0) {
                Ok(c) => Some(c),
                Err(e) => {
                    log::warn!("item '{}': {}", item.label, e);
                    None
                }
            })
            .unwrap_or(self.colors.item)
    }
}

impl ItemProvider for ConfiguredItems {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn item_visual(&self, index: usize) -> ItemVisual {
        let item = &self.items[index];
        ItemVisual {
            size: self.item_size,
            color: self.item_color(item),
            label: Some(item.label.clone()),
        }
    }

    fn accessory_visual(&self, index: usize) -> Option<AccessoryVisual> {
        self.items[index]
            .accessory
            .as_ref()
            .map(|label| AccessoryVisual {
                size: self.accessory_size,
                color: self.colors.accessory,
                label: Some(label.clone()),
            })
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedViewport {
    bounds: Rect,
    anchor: Rect,
}

impl FixedViewport {
    pub fn new(bounds: Rect, anchor: Rect) -> Self {
        Self { bounds, anchor }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.viewport.bounds(), config.viewport.anchor_frame())
    }
}

impl Viewport for FixedViewport {
    fn root_bounds(&self) -> Option<Rect> {
        (!self.bounds.is_empty()).then_some(self.bounds)
    }

    fn anchor_frame(&self) -> Rect {
        self.anchor
    }
}

/// Logs selections and keeps the labels around.
#[derive(Debug, Default)]
pub struct LoggingDelegate {
    selected: Vec<Label>,
}

impl LoggingDelegate {
    pub fn selected(&self) -> &[Label] {
        &self.selected
    }
}

impl SelectionDelegate for LoggingDelegate {
    fn on_select(&mut self, item: &SelectedItem) {
        let label = item
            .node
            .label
            .clone()
            .unwrap_or_else(|| Label::new(format!("#{}", item.index)));
        log::info!("Selected '{}'", label);
        self.selected.push(label);
    }
}

pub type HostMenu = ExplosionMenu<ConfiguredItems, LoggingDelegate, FixedViewport>;

pub struct Host {
    menu: HostMenu,
    recognizer: PressRecognizer,
    pending_reload: Option<Config>,
}

impl Host {
    pub fn new(config: &Config) -> Self {
        let menu = ExplosionMenu::new(
            ConfiguredItems::from_config(config),
            LoggingDelegate::default(),
            FixedViewport::from_config(config),
            config.menu.clone(),
            ThemeColors::from_config(&config.theme),
        );

        Self {
            menu,
            recognizer: PressRecognizer::from_config(&config.gesture),
            pending_reload: None,
        }
    }

    pub fn menu(&self) -> &HostMenu {
        &self.menu
    }

    pub fn update(&mut self, event: AppEvent, now: Duration) {
        match event {
            AppEvent::Touch(sample) => {
                for menu_event in self.recognizer.touch(now, sample) {
                    self.menu.handle(now, menu_event);
                }
            }
            AppEvent::Frame => {
                if let Some(menu_event) = self.recognizer.tick(now) {
                    self.menu.handle(now, menu_event);
                }
                self.menu.tick(now);
                self.apply_pending_reload();
            }
            AppEvent::ConfigReload => match config::load_config() {
                Ok(new_config) => self.reload(new_config),
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }

    /// Applied once no press is in progress.
    pub fn reload(&mut self, config: Config) {
        self.pending_reload = Some(config);
        self.apply_pending_reload();
    }

    fn apply_pending_reload(&mut self) {
        if self.menu.phase() != Phase::Idle || self.recognizer.is_recognized() {
            return;
        }
        let Some(config) = self.pending_reload.take() else {
            return;
        };

        self.menu.set_config(
            config.menu.clone(),
            ThemeColors::from_config(&config.theme),
        );
        *self.menu.provider_mut() = ConfiguredItems::from_config(&config);
        *self.menu.viewport_mut() = FixedViewport::from_config(&config);
        self.recognizer = PressRecognizer::from_config(&config.gesture);
        log::info!("Configuration reloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit::geom::Point;
    use orbit::touch::{TouchPhase, TouchSample};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn frames(host: &mut Host, from: u64, to: u64) {
        let mut t = from;
        while t <= to {
            host.update(AppEvent::Frame, ms(t));
            t += 16;
        }
    }

    fn touch(host: &mut Host, t: u64, phase: TouchPhase, x: f64, y: f64) {
        host.update(AppEvent::Touch(TouchSample::new(phase, Point::new(x, y))), ms(t));
    }

    #[test]
    fn test_long_press_select_and_release() {
        let mut host = Host::new(&Config::default());
        let anchor = Config::default().viewport.anchor;

        touch(&mut host, 0, TouchPhase::Down, anchor.x, anchor.y);
        frames(&mut host, 0, 48);
        assert_eq!(host.menu().phase(), Phase::Idle);
        frames(&mut host, 64, 64);
        assert_eq!(host.menu().phase(), Phase::Entering);

        frames(&mut host, 80, 500);
        assert_eq!(host.menu().phase(), Phase::Tracking);

        touch(&mut host, 500, TouchPhase::Move, anchor.x + 80.0, anchor.y);
        frames(&mut host, 516, 800);
        touch(&mut host, 800, TouchPhase::Up, anchor.x + 80.0, anchor.y);
        assert_eq!(host.menu().phase(), Phase::Exiting);

        frames(&mut host, 816, 2000);
        assert_eq!(host.menu().phase(), Phase::Idle);
        let selected: Vec<&str> = host
            .menu()
            .delegate()
            .selected()
            .iter()
            .map(|l| l.as_str())
            .collect();
        assert_eq!(selected, vec!["Travel"]);
    }

    #[test]
    fn test_quick_tap_does_not_open() {
        let mut host = Host::new(&Config::default());
        touch(&mut host, 0, TouchPhase::Down, 100.0, 422.0);
        frames(&mut host, 0, 32);
        touch(&mut host, 40, TouchPhase::Up, 100.0, 422.0);
        frames(&mut host, 48, 500);
        assert_eq!(host.menu().phase(), Phase::Idle);
        assert!(host.menu().delegate().selected().is_empty());
    }

    #[test]
    fn test_reload_waits_for_idle() {
        let mut host = Host::new(&Config::default());
        touch(&mut host, 0, TouchPhase::Down, 100.0, 422.0);
        frames(&mut host, 0, 100);
        assert_eq!(host.menu().phase(), Phase::Entering);

        let mut config = Config::default();
        config.items.truncate(2);
        host.reload(config);
        assert_eq!(host.menu().provider().item_count(), 5);

        touch(&mut host, 400, TouchPhase::Up, 0.0, 0.0);
        frames(&mut host, 400, 2000);
        assert_eq!(host.menu().phase(), Phase::Idle);
        assert_eq!(host.menu().provider().item_count(), 2);
    }

    #[test]
    fn test_configured_items() {
        let mut config = Config::default();
        config.items[0].color = Some("#00ff00".to_string());
        config.items[1].color = Some("bogus".to_string());
        config.items[1].accessory = None;
        let items = ConfiguredItems::from_config(&config);

        assert_eq!(items.item_count(), 5);
        assert_eq!(items.radius(), 80.0);
        assert_eq!(
            items.item_visual(0).color,
            Srgba::new(0.0, 1.0, 0.0, 1.0)
        );
        assert_eq!(
            items.item_visual(1).color,
            ThemeColors::from_config(&config.theme).item
        );
        assert!(items.accessory_visual(1).is_none());
        assert_eq!(
            items.accessory_visual(0).unwrap().label,
            Some(Label::from("Groceries & dining"))
        );
    }

    #[test]
    fn test_empty_viewport_has_no_root() {
        let viewport = FixedViewport::new(Rect::default(), Rect::default());
        assert!(viewport.root_bounds().is_none());
    }
}
