use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};
use tree_sitter::Tree;

use crate::error::{IoError, LoadError, ParserError, Result};
use crate::utils::relative_path;

use super::config::{
    DEFAULT_PATTERN, EXTERNAL_TEST_SUFFIX, GO_EXTENSION, MAX_FILE_SIZE, TEST_FILE_SUFFIX,
};
use super::constraints::{find_build_expr, parse_constraint, BuildContext};
use super::module::GoModule;
use super::parser::{go_parser, parse_go};
use super::patterns::Pattern;

/// What to load: the working directory, package patterns and build tags.
#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    pub dir: PathBuf,
    pub patterns: Vec<String>,
    pub build_tags: Vec<String>,
}

impl LoadRequest {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn with_patterns<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_build_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.build_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// One parsed test file.
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    pub tree: Tree,
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("bytes", &self.source.len())
            .finish()
    }
}

/// A test package: its id, directory and parsed `_test.go` files.
#[derive(Debug)]
pub struct Package {
    pub id: String,
    pub directory: PathBuf,
    pub files: Vec<SourceFile>,
}

pub trait PackageLoader {
    /// Loads every test package named by the request. Any failure is
    /// reported for the whole request.
    fn load(&self, request: &LoadRequest) -> Result<Vec<Package>>;
}

/// Loads Go packages straight from the file system.
#[derive(Debug, Default)]
pub struct GoPackageLoader;

impl PackageLoader for GoPackageLoader {
    fn load(&self, request: &LoadRequest) -> Result<Vec<Package>> {
        if !request.dir.is_dir() {
            return Err(IoError::directory_not_found(&request.dir).into());
        }
        let dir = request
            .dir
            .canonicalize()
            .map_err(|e| IoError::read_error(&request.dir, e))?;

        let module = GoModule::find(&dir)?;
        match &module {
            Some(m) => debug!(module = %m.path, root = %m.root.display(), "found module"),
            None => debug!(dir = %dir.display(), "no go.mod found, using directory paths"),
        }

        let build = BuildContext::from_env(&request.build_tags);
        debug!(goos = build.goos(), goarch = build.goarch(), "build context");

        let raw_patterns: Vec<&str> = if request.patterns.is_empty() {
            vec![DEFAULT_PATTERN]
        } else {
            request.patterns.iter().map(String::as_str).collect()
        };

        let mut dirs = BTreeSet::new();
        for raw in raw_patterns {
            let pattern = Pattern::parse(raw, &dir, module.as_ref());
            trace!(pattern = raw, resolved = ?pattern, "expanding pattern");
            dirs.extend(pattern.directories()?);
        }

        info!(candidates = dirs.len(), "loading packages");

        let mut parser = go_parser()?;
        let mut package_count = 0usize;
        let mut packages = Vec::new();

        for pkg_dir in dirs {
            let Some(listing) = read_package_dir(&pkg_dir, &build)? else {
                continue;
            };
            package_count += 1;

            if listing.test_files.is_empty() {
                trace!(dir = %pkg_dir.display(), "package has no test files");
                continue;
            }

            let base_id = package_id(&dir, &pkg_dir, module.as_ref());
            let mut internal = Vec::new();
            let mut external = Vec::new();

            for (path, source) in listing.test_files {
                let tree = parse_go(&mut parser, &path, &source)?;
                let name = package_clause(&tree, &source);
                let file = SourceFile { path, source, tree };
                if name.is_some_and(|n| n.ends_with(EXTERNAL_TEST_SUFFIX)) {
                    external.push(file);
                } else {
                    internal.push(file);
                }
            }

            if !internal.is_empty() {
                packages.push(Package {
                    id: base_id.clone(),
                    directory: pkg_dir.clone(),
                    files: internal,
                });
            }
            if !external.is_empty() {
                packages.push(Package {
                    id: format!("{base_id}{EXTERNAL_TEST_SUFFIX}"),
                    directory: pkg_dir.clone(),
                    files: external,
                });
            }
        }

        if package_count == 0 {
            return Err(LoadError::NoPackages.into());
        }

        packages.sort_by(|a, b| a.id.cmp(&b.id));
        info!(
            packages = package_count,
            test_packages = packages.len(),
            "packages loaded"
        );
        Ok(packages)
    }
}

struct PackageListing {
    test_files: Vec<(PathBuf, String)>,
}

/// Reads the Go files of one directory. `None` when the directory holds no
/// buildable Go file and is therefore not a package.
fn read_package_dir(dir: &Path, build: &BuildContext) -> Result<Option<PackageListing>> {
    let entries = fs::read_dir(dir).map_err(|e| IoError::read_error(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::read_error(dir, e))?;
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != GO_EXTENSION) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }
        names.push((name, path));
    }
    names.sort();

    let mut has_go_files = false;
    let mut test_files = Vec::new();

    for (name, path) in names {
        if !build.matches_file_name(&name) {
            trace!(file = %path.display(), "excluded by file name constraint");
            continue;
        }

        let source = read_source(&path)?;
        if let Some(expr) = find_build_expr(&source) {
            let constraint = parse_constraint(expr)
                .map_err(|msg| ParserError::invalid_constraint(&path, expr, msg))?;
            if !build.eval(&constraint) {
                trace!(file = %path.display(), expr, "excluded by //go:build");
                continue;
            }
        }

        has_go_files = true;
        if name.ends_with(TEST_FILE_SUFFIX) {
            test_files.push((path, source));
        }
    }

    Ok(has_go_files.then_some(PackageListing { test_files }))
}

fn read_source(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| IoError::read_error(path, e))?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(IoError::file_too_large(path, metadata.len(), MAX_FILE_SIZE).into());
    }
    fs::read_to_string(path).map_err(|e| IoError::read_error(path, e).into())
}

fn package_clause(tree: &Tree, source: &str) -> Option<String> {
    let root = tree.root_node();
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_clause")?;
    let mut inner = clause.walk();
    let name = clause
        .named_children(&mut inner)
        .find(|n| n.kind() == "package_identifier")?;
    name.utf8_text(source.as_bytes()).ok().map(str::to_string)
}

fn package_id(dir: &Path, pkg_dir: &Path, module: Option<&GoModule>) -> String {
    if let Some(module) = module {
        if let Some(import_path) = module.import_path(pkg_dir) {
            return module.package_id(&import_path);
        }
    }

    let rel = relative_path(dir, pkg_dir);
    if rel == Path::new(".") {
        return pkg_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
    }
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parses a single source outside a package walk.
pub fn parse_source(path: impl AsRef<Path>, source: impl Into<String>) -> Result<SourceFile> {
    let path = path.as_ref().to_path_buf();
    let source = source.into();
    let mut parser = go_parser()?;
    let tree = parse_go(&mut parser, &path, &source)?;
    Ok(SourceFile { path, source, tree })
}
