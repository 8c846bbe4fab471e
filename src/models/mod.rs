// ABOUTME: Core data models for the tool catalog shown on the dashboard

pub mod catalog;

pub use catalog::{Catalog, CatalogError, Category, Tool, ToolEntry};
