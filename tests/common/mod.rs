//! Common test utilities for Satchel integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// An application root for integration tests
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the application root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Write satchel.yaml
    pub fn write_config(&self, yaml: &str) {
        self.write_file("satchel.yaml", yaml);
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// A small site: an app script bundle depending on a lib bundle, a
    /// stylesheet bundle and a template bundle
    pub fn with_sample_site(&self) {
        self.write_config(
            "settings:\n  \
               route_prefix: assets\n\
             bundles:\n  \
               - path: scripts/app\n    \
                 kind: script\n    \
                 html_attributes:\n      \
                   defer: \"\"\n  \
               - path: scripts/lib\n    \
                 kind: script\n  \
               - path: styles\n    \
                 kind: stylesheet\n  \
               - path: templates\n    \
                 kind: html_template\n",
        );
        self.write_file(
            "scripts/app/main.js",
            "// @reference \"helpers.js\" ~/scripts/lib\nvar title = i18n.t('App.Title');\n",
        );
        self.write_file("scripts/app/helpers.js", "function help() {}\n");
        self.write_file(
            "scripts/lib/lib.js",
            "/* @abconfig NewLib */\nfunction lib() {}\n",
        );
        self.write_file(
            "styles/site.css",
            ".logo { background: url(\"../images/logo.png\"); }\n",
        );
        self.write_file("images/logo.png", "png");
        self.write_file(
            "templates/card.htm",
            "<!-- @reference ~/scripts/app -->\n<div>{{#i18n}}Card.Title{{/i18n}}</div>\n",
        );
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
    }

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("test/file.txt", "hello");
        assert!(workspace.file_exists("test/file.txt"));
        assert_eq!(workspace.read_file("test/file.txt"), "hello");
    }
}
