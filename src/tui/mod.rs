// src/tui/mod.rs
//
// Terminal dashboard.

pub mod app;
mod ui;
