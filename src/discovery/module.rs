use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoError, LoadError, Result};

use super::config::GO_MOD;

/// A Go module: the directory holding `go.mod` and its declared path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    pub root: PathBuf,
    pub path: String,
}

impl GoModule {
    /// Walks up from `dir` to the nearest `go.mod`.
    pub fn find(dir: &Path) -> Result<Option<Self>> {
        for candidate in dir.ancestors() {
            let go_mod = candidate.join(GO_MOD);
            if go_mod.is_file() {
                let content =
                    fs::read_to_string(&go_mod).map_err(|e| IoError::read_error(&go_mod, e))?;
                let path = parse_module_path(&content)
                    .ok_or_else(|| LoadError::invalid_module(&go_mod, "missing module directive"))?;
                return Ok(Some(Self {
                    root: candidate.to_path_buf(),
                    path,
                }));
            }
        }
        Ok(None)
    }

    /// Import path of the package in `dir`, if `dir` lies inside the module.
    pub fn import_path(&self, dir: &Path) -> Option<String> {
        let rel = dir.strip_prefix(&self.root).ok()?;
        let segments: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments.is_empty() {
            Some(self.path.clone())
        } else {
            Some(format!("{}/{}", self.path, segments.join("/")))
        }
    }

    /// Package id as printed by the tool: the import path with the module
    /// prefix removed. The module's root package keeps its full path.
    pub fn package_id(&self, import_path: &str) -> String {
        import_path
            .strip_prefix(&format!("{}/", self.path))
            .unwrap_or(import_path)
            .to_string()
    }

    /// Maps an import-path pattern such as `example.com/m/pkg` to a
    /// directory inside the module.
    pub fn dir_for_import_path(&self, import_path: &str) -> Option<PathBuf> {
        if import_path == self.path {
            return Some(self.root.clone());
        }
        let rel = import_path.strip_prefix(&format!("{}/", self.path))?;
        Some(self.root.join(rel))
    }
}

/// Extracts the path from the `module` directive. Accepts quoted paths and
/// trailing `//` comments.
pub fn parse_module_path(go_mod: &str) -> Option<String> {
    for line in go_mod.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        let Some(rest) = line.strip_prefix("module") else {
            continue;
        };
        if !rest.starts_with([' ', '\t']) {
            continue;
        }
        let path = rest.trim().trim_matches(|c| c == '"' || c == '`');
        if !path.is_empty() {
            return Some(path.to_string());
        }
    }
    None
}
