use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::Lesson;

#[derive(Deserialize)]
struct CatalogContainer {
    lessons: Vec<Lesson>,
}

/// Load the built-in lesson catalog
pub fn load_builtin() -> Result<Vec<Lesson>> {
    let catalog_json = include_str!("../../resources/lessons.json");
    parse_catalog(catalog_json).context("Built-in lesson catalog is invalid")
}

/// Load a lesson catalog with the same shape as the built-in one from disk
pub fn load_from_file(path: &Path) -> Result<Vec<Lesson>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lessons from {}", path.display()))?;
    parse_catalog(&data).with_context(|| format!("Invalid lesson file {}", path.display()))
}

pub fn parse_catalog(json: &str) -> Result<Vec<Lesson>> {
    let catalog: CatalogContainer = serde_json::from_str(json)?;
    if catalog.lessons.is_empty() {
        anyhow::bail!("Lesson catalog contains no lessons");
    }
    Ok(catalog.lessons)
}
