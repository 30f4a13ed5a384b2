use crate::menu::anim::{Curve, Easing};
use crate::menu::scene::Label;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use orbit::geom::{Point, Rect, Size};
use orbit::layout::DEFAULT_SPREAD_DEGREES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Timings, scales and layout of the menu itself. Durations are in
/// milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MenuConfig {
    pub radius: f64,
    pub spread_degrees: u32,
    pub entrance_guard_ms: u64,

    pub highlight_scale: f64,
    pub highlight_grow_ms: u64,
    pub highlight_curve: Curve,
    pub spring_damping: f64,
    pub spring_velocity: f64,
    pub highlight_shrink_scale: f64,
    pub highlight_shrink_ms: u64,

    pub backdrop_opacity: f64,
    pub backdrop_fade_in_ms: u64,
    pub backdrop_fade_out_ms: u64,

    pub item_size: f64,
    pub item_start_scale: f64,
    pub item_fly_out_ms: u64,
    pub item_fly_in_ms: u64,
    pub item_stagger_ms: u64,
    pub item_curve: Curve,
    pub hover_scale: f64,
    pub hover_ms: u64,

    pub accessory_width: f64,
    pub accessory_height: f64,
    pub accessory_gap: f64,
    pub accessory_fade_ms: u64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            radius: 80.0,
            spread_degrees: DEFAULT_SPREAD_DEGREES,
            entrance_guard_ms: 300,
            highlight_scale: 1.5,
            highlight_grow_ms: 300,
            highlight_curve: Curve::Spring,
            spring_damping: 0.3,
            spring_velocity: 0.7,
            highlight_shrink_scale: 0.5,
            highlight_shrink_ms: 300,
            backdrop_opacity: 0.2,
            backdrop_fade_in_ms: 200,
            backdrop_fade_out_ms: 200,
            item_size: 44.0,
            item_start_scale: 0.1,
            item_fly_out_ms: 250,
            item_fly_in_ms: 200,
            item_stagger_ms: 30,
            item_curve: Curve::EaseOut,
            hover_scale: 1.3,
            hover_ms: 120,
            accessory_width: 96.0,
            accessory_height: 28.0,
            accessory_gap: 8.0,
            accessory_fade_ms: 150,
        }
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

impl MenuConfig {
    pub fn entrance_guard(&self) -> Duration {
        ms(self.entrance_guard_ms)
    }

    pub fn highlight_easing(&self) -> Easing {
        Easing::from_curve(
            self.highlight_curve,
            self.spring_damping,
            self.spring_velocity,
        )
    }

    pub fn item_easing(&self) -> Easing {
        Easing::from_curve(self.item_curve, self.spring_damping, self.spring_velocity)
    }

    pub fn highlight_grow(&self) -> Duration {
        ms(self.highlight_grow_ms)
    }

    pub fn highlight_shrink(&self) -> Duration {
        ms(self.highlight_shrink_ms)
    }

    pub fn backdrop_fade_in(&self) -> Duration {
        ms(self.backdrop_fade_in_ms)
    }

    pub fn backdrop_fade_out(&self) -> Duration {
        ms(self.backdrop_fade_out_ms)
    }

    pub fn item_fly_out(&self) -> Duration {
        ms(self.item_fly_out_ms)
    }

    pub fn item_fly_in(&self) -> Duration {
        ms(self.item_fly_in_ms)
    }

    pub fn item_stagger(&self) -> Duration {
        ms(self.item_stagger_ms)
    }

    pub fn hover(&self) -> Duration {
        ms(self.hover_ms)
    }

    pub fn accessory_fade(&self) -> Duration {
        ms(self.accessory_fade_ms)
    }

    pub fn accessory_size(&self) -> Size {
        Size::new(self.accessory_width, self.accessory_height)
    }
}

/// Hex colors; the highlight alpha is kept separate so the circle can be
/// translucent while the hex stays a plain RGB value.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    pub highlight: String,
    pub highlight_alpha: f64,
    pub anchor: String,
    pub backdrop: String,
    pub item: String,
    pub accessory: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            highlight: "#ff0000".to_string(),
            highlight_alpha: 0.5,
            anchor: "#ffff00".to_string(),
            backdrop: "#000000".to_string(),
            item: "#3378f5".to_string(),
            accessory: "#1c1c1f".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GestureConfig {
    pub minimum_press_ms: f64,
    pub allowable_movement: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            minimum_press_ms: 62.5,
            allowable_movement: 10.0,
        }
    }
}

impl GestureConfig {
    pub fn minimum_press(&self) -> Duration {
        Duration::from_secs_f64(self.minimum_press_ms.max(0.0) / 1000.0)
    }
}

/// Screen and anchor geometry for the headless host.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    pub anchor: Point,
    pub anchor_size: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 844.0,
            anchor: Point::new(100.0, 422.0),
            anchor_size: 64.0,
        }
    }
}

impl ViewportConfig {
    pub fn bounds(&self) -> Rect {
        Rect::new(Point::default(), Size::new(self.width, self.height))
    }

    pub fn anchor_frame(&self) -> Rect {
        Rect::from_center(self.anchor, Size::square(self.anchor_size))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ItemConfig {
    pub label: Label,
    pub accessory: Option<Label>,
    pub color: Option<String>,
}

impl ItemConfig {
    fn new(label: &str, accessory: &str) -> Self {
        Self {
            label: Label::from(label),
            accessory: Some(Label::from(accessory)),
            color: None,
        }
    }
}

fn default_items() -> Vec<ItemConfig> {
    vec![
        ItemConfig::new("Food", "Groceries & dining"),
        ItemConfig::new("Home", "Rent & utilities"),
        ItemConfig::new("Travel", "Transport & trips"),
        ItemConfig::new("Health", "Care & pharmacy"),
        ItemConfig::new("Fun", "Leisure"),
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default = "default_items")]
    pub items: Vec<ItemConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            menu: MenuConfig::default(),
            theme: ThemeConfig::default(),
            gesture: GestureConfig::default(),
            viewport: ViewportConfig::default(),
            items: default_items(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "explosion", "explosion")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(
            config::Environment::with_prefix("EXPLOSION")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        if !touches_config(res, &config_path) {
            continue;
        }
        // Editors save in bursts; one reload covers them all.
        while let Ok(Ok(_)) = tokio::time::timeout(RELOAD_SETTLE, bridge_rx.recv()).await {}

        log::debug!("{} changed", config_path.display());
        if tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
}

const RELOAD_SETTLE: Duration = Duration::from_millis(100);

fn touches_config(res: notify::Result<notify::Event>, config_path: &Path) -> bool {
    match res {
        Ok(event) => {
            matches!(
                event.kind,
                EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
            ) && event.paths.iter().any(|p| p == config_path)
        }
        Err(e) => {
            log::error!("Watch error: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_file_changes_trigger_reload() {
        let path = Path::new("/tmp/explosion/config.toml");
        let modify = |p: &str| {
            Ok(notify::Event::new(EventKind::Modify(notify::event::ModifyKind::Any))
                .add_path(p.into()))
        };
        assert!(touches_config(modify("/tmp/explosion/config.toml"), path));
        assert!(!touches_config(modify("/tmp/explosion/config.toml~"), path));

        let access = notify::Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(path.to_path_buf());
        assert!(!touches_config(Ok(access), path));
        assert!(!touches_config(Err(notify::Error::generic("gone")), path));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.items.len(), 5);
        assert_eq!(config.menu.entrance_guard(), Duration::from_millis(300));
        assert_eq!(config.gesture.minimum_press(), Duration::from_micros(62_500));
    }

    #[test]
    fn test_partial_menu_section() {
        let json = r##"{
            "menu": { "radius": 120.0, "highlight_curve": "ease-in-out" },
            "items": [{ "label": "Only", "accessory": null, "color": "#00ff00" }]
        }"##;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.menu.radius, 120.0);
        assert_eq!(config.menu.highlight_curve, Curve::EaseInOut);
        assert_eq!(config.menu.highlight_easing(), Easing::EaseInOut);
        assert_eq!(config.menu.hover_scale, 1.3);
        assert_eq!(config.items.len(), 1);
        assert_eq!(config.items[0].label.as_str(), "Only");
        assert_eq!(config.items[0].color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_curve_deserialization() {
        let cases = vec![
            ("\"spring\"", Curve::Spring),
            ("\"Spring\"", Curve::Spring),
            ("\"ease-out\"", Curve::EaseOut),
            ("\"EASE-IN\"", Curve::EaseIn),
            ("\"linear\"", Curve::Linear),
        ];

        for (json, expected) in cases {
            let deserialized: Curve = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn test_bundled_config_parses() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let parsed: Config = s.try_deserialize().unwrap();
        assert_eq!(parsed.menu, MenuConfig::default());
        assert_eq!(parsed.items.len(), 5);
    }
}
