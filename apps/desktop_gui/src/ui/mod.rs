//! UI layer for desktop GUI: app shell, canvas, panels and theme.

pub mod app;
pub mod canvas;
pub mod panels;
pub mod theme;

pub use app::LwvApp;
