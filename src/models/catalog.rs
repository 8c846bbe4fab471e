// ABOUTME: Tool catalog model mirroring the server's ordered category and tool collections
// Category and tool positions double as the indices sent to the server API

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),

    #[error("Failed to parse catalog {0}: {1}")]
    ParseFailed(String, toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_url: String,
    #[serde(default)]
    pub install_commands: Vec<String>,
    #[serde(default)]
    pub run_commands: Vec<String>,
    /// Tool is driven by a server-side run routine instead of run commands
    #[serde(default)]
    pub custom_run: bool,
}

impl Tool {
    pub fn has_install(&self) -> bool {
        !self.install_commands.is_empty()
    }

    pub fn has_run(&self) -> bool {
        !self.run_commands.is_empty() || self.custom_run
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG, "<builtin>")
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::ReadFailed(path.to_path_buf(), e))?;
        Self::parse(&contents, &path.display().to_string())
    }

    fn parse(contents: &str, origin: &str) -> Result<Self, CatalogError> {
        toml::from_str(contents).map_err(|e| CatalogError::ParseFailed(origin.to_string(), e))
    }

    pub fn tool(&self, category_idx: usize, tool_idx: usize) -> Option<&Tool> {
        self.categories.get(category_idx)?.tools.get(tool_idx)
    }

    /// Flatten the catalog into list entries, all initially visible
    pub fn entries(&self) -> Vec<ToolEntry> {
        self.categories
            .iter()
            .enumerate()
            .flat_map(|(category_idx, category)| {
                category
                    .tools
                    .iter()
                    .enumerate()
                    .map(move |(tool_idx, tool)| ToolEntry::new(category_idx, tool_idx, tool))
            })
            .collect()
    }
}

/// A tool as it appears in the dashboard list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEntry {
    pub category_idx: usize,
    pub tool_idx: usize,
    pub name: String,
    /// Lowercased name, computed once so filtering never re-lowercases it
    pub name_attr: String,
    pub description: String,
    pub visible: bool,
}

impl ToolEntry {
    pub fn new(category_idx: usize, tool_idx: usize, tool: &Tool) -> Self {
        Self {
            category_idx,
            tool_idx,
            name: tool.title.clone(),
            name_attr: tool.title.to_lowercase(),
            description: tool.description.clone(),
            visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.categories.is_empty());
        assert!(catalog.categories.iter().all(|c| !c.tools.is_empty()));
    }

    #[test]
    fn load_from_file_keeps_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[categories]]
title = "First"

[[categories.tools]]
title = "Alpha"
run_commands = ["alpha"]

[[categories.tools]]
title = "Beta"
custom_run = true

[[categories]]
title = "Second"
"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.categories.len(), 2);
        assert_eq!(catalog.tool(0, 1).unwrap().title, "Beta");
        assert!(catalog.tool(0, 1).unwrap().has_run());
        assert!(!catalog.tool(0, 1).unwrap().has_install());
        assert!(catalog.tool(1, 0).is_none());
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "categories = 3").unwrap();
        assert!(matches!(
            Catalog::load(file.path()),
            Err(CatalogError::ParseFailed(_, _))
        ));
    }

    #[test]
    fn entries_carry_indices_and_lowercase_name() {
        let catalog = Catalog::new(vec![
            Category {
                title: "A".into(),
                tools: vec![Tool {
                    title: "Nmap Port Scanner".into(),
                    ..Tool::default()
                }],
                ..Category::default()
            },
            Category {
                title: "B".into(),
                tools: vec![
                    Tool::default(),
                    Tool {
                        title: "Wireshark".into(),
                        ..Tool::default()
                    },
                ],
                ..Category::default()
            },
        ]);

        let entries = catalog.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name_attr, "nmap port scanner");
        assert_eq!((entries[2].category_idx, entries[2].tool_idx), (1, 1));
        assert!(entries.iter().all(|e| e.visible));
    }
}
