use std::path::{Path, PathBuf};

use tracing::{trace, warn};
use walkdir::WalkDir;

use crate::error::{IoError, Result};

use super::config::{EXCLUDED_DIRS, GO_MOD, RECURSIVE_SUFFIX};
use super::module::GoModule;

/// One command-line pattern, resolved against the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// A single package directory.
    Dir(PathBuf),
    /// A directory and every package below it.
    Tree(PathBuf),
}

impl Pattern {
    pub fn parse(raw: &str, dir: &Path, module: Option<&GoModule>) -> Self {
        let (base, recursive) = match raw.strip_suffix(RECURSIVE_SUFFIX) {
            Some(base) => (base.trim_end_matches('/'), true),
            None => (raw, false),
        };

        let path = if base.is_empty() || base == "." {
            dir.to_path_buf()
        } else if Path::new(base).is_absolute() || base.starts_with('.') {
            dir.join(base)
        } else if let Some(mapped) = module.and_then(|m| m.dir_for_import_path(base)) {
            mapped
        } else {
            dir.join(base)
        };

        let path = normalize(&path);
        if recursive {
            Self::Tree(path)
        } else {
            Self::Dir(path)
        }
    }

    /// Candidate package directories named by this pattern.
    pub fn directories(&self) -> Result<Vec<PathBuf>> {
        match self {
            Self::Dir(path) => {
                if !path.is_dir() {
                    return Err(IoError::directory_not_found(path).into());
                }
                Ok(vec![path.clone()])
            }
            Self::Tree(root) => walk_package_dirs(root),
        }
    }
}

/// Removes `.` components and folds `..` lexically, so `./.` and `./a/..`
/// name the same directory as their targets.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

fn is_skipped_dir_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_') || EXCLUDED_DIRS.contains(&name)
}

/// Every directory under `root` a `...` pattern reaches: hidden,
/// underscore, `testdata` and `vendor` directories are pruned, as are
/// nested modules.
pub fn walk_package_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(IoError::directory_not_found(root).into());
    }

    let mut dirs = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if !e.file_type().is_dir() || e.depth() == 0 {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            if is_skipped_dir_name(&name) {
                return false;
            }
            !e.path().join(GO_MOD).is_file()
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
            Err(e) => return Err(IoError::walk_error(root, e).into()),
        };

        if entry.file_type().is_dir() {
            trace!(dir = %entry.path().display(), "candidate package directory");
            dirs.push(entry.into_path());
        }
    }

    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_forms() {
        let dir = Path::new("/work");
        assert_eq!(Pattern::parse("./.", dir, None), Pattern::Dir(PathBuf::from("/work")));
        assert_eq!(Pattern::parse(".", dir, None), Pattern::Dir(PathBuf::from("/work")));
        assert_eq!(Pattern::parse("./...", dir, None), Pattern::Tree(PathBuf::from("/work")));
        assert_eq!(Pattern::parse("...", dir, None), Pattern::Tree(PathBuf::from("/work")));
        assert_eq!(
            Pattern::parse("./pkg/...", dir, None),
            Pattern::Tree(PathBuf::from("/work/pkg"))
        );
        assert_eq!(
            Pattern::parse("pkg/a", dir, None),
            Pattern::Dir(PathBuf::from("/work/pkg/a"))
        );
        assert_eq!(
            Pattern::parse("/abs/dir", dir, None),
            Pattern::Dir(PathBuf::from("/abs/dir"))
        );
    }

    #[test]
    fn test_parse_import_path_pattern() {
        let module = GoModule {
            root: PathBuf::from("/work/m"),
            path: "example.com/m".to_string(),
        };
        assert_eq!(
            Pattern::parse("example.com/m/pkg/...", Path::new("/work/m"), Some(&module)),
            Pattern::Tree(PathBuf::from("/work/m/pkg"))
        );
    }

    #[test]
    fn test_walk_prunes_special_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for dir in ["a/b", "testdata/x", "vendor/y", ".git", "_tmp", "nested/inner"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("nested/go.mod"), "module nested\n").unwrap();

        let dirs = walk_package_dirs(root).unwrap();
        let rel: Vec<PathBuf> = dirs
            .iter()
            .map(|d| d.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            rel,
            vec![PathBuf::from(""), PathBuf::from("a"), PathBuf::from("a/b")]
        );
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let pattern = Pattern::Dir(PathBuf::from("/nonexistent/listests/dir"));
        assert!(pattern.directories().is_err());
    }
}
