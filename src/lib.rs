// ABOUTME: Library crate for Toolbench exposing the dashboard, API client and terminal relay

pub mod api;
pub mod app;
pub mod components;
pub mod config;
pub mod models;
pub mod terminal;
