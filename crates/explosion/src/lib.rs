pub mod config;
pub mod events;
pub mod gesture;
pub mod host;
pub mod menu;
pub mod sys;
