//! The discovery engine: recognizes tests in parsed Go files, extracts their
//! subtests and produces the sorted test hierarchy.

pub mod context;
pub mod finder;
pub mod node_types;
pub mod recognizer;
pub mod sanitize;
pub mod scope;
pub mod stream;
pub mod subtests;
pub mod table;

use std::path::Path;

use tracing::info;

use crate::cancel::CancelToken;
use crate::discovery::{parse_source, GoPackageLoader, LoadRequest, Package, PackageLoader};
use crate::error::Result;
use crate::tree::Forest;

pub use context::TraversalContext;
pub use finder::TestFinder;
pub use recognizer::is_test_function;
pub use sanitize::rewrite_subtest_name;
pub use scope::Scope;
pub use stream::{PackageTests, TestStream};
pub use subtests::{NameArg, RunCall};
pub use table::{resolve_table_entries, TableEntry, TypeIndex};

/// Names the Go testing package gives meaning to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
    /// Prefix of test function names.
    pub test_prefix: String,
    /// Pointee of the single test parameter, `testing.T`.
    pub context_type: String,
    /// Method registering a subtest.
    pub run_method: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            test_prefix: "Test".to_string(),
            context_type: "T".to_string(),
            run_method: "Run".to_string(),
        }
    }
}

/// Which table entries a `Run` callback's own subtests are attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CallbackPolicy {
    /// Only the last entry.
    #[default]
    Last,
    /// Every entry.
    All,
    /// No entry; nested subtests of table callbacks are dropped.
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderOptions {
    pub conventions: Conventions,
    pub callbacks: CallbackPolicy,
}

/// Loads the packages named by `request` and returns a stream producing
/// their tests one package at a time. Load failures are returned before any
/// test is produced.
pub fn find_tests(
    request: &LoadRequest,
    options: &FinderOptions,
    cancel: CancelToken,
) -> Result<TestStream> {
    find_tests_with(&GoPackageLoader, request, options, cancel)
}

pub fn find_tests_with(
    loader: &dyn PackageLoader,
    request: &LoadRequest,
    options: &FinderOptions,
    cancel: CancelToken,
) -> Result<TestStream> {
    let packages = loader.load(request)?;
    info!(packages = packages.len(), "discovering tests");
    Ok(TestStream::new(
        packages,
        TestFinder::new(options.clone()),
        cancel,
    ))
}

/// Finds the tests of a single in-memory file treated as package `package`.
pub fn find_tests_in_source(
    package: &str,
    path: impl AsRef<Path>,
    source: impl Into<String>,
    options: &FinderOptions,
) -> Result<Forest> {
    let file = parse_source(path, source)?;
    let directory = file
        .path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let package = Package {
        id: package.to_string(),
        directory,
        files: vec![file],
    };
    Ok(TestFinder::new(options.clone()).find_in_package(&package))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tests_in_source() {
        let source = "package p\n\nfunc TestA(t *testing.T) {\n\tt.Run(\"x\", func(t *testing.T) {})\n}\n";
        let forest =
            find_tests_in_source("p", "/p/a_test.go", source, &FinderOptions::default()).unwrap();
        let found = forest.find("TestA/x").unwrap();
        assert_eq!(found.package, "p");
        assert_eq!(found.directory, Path::new("/p"));
        assert!(found.is_subtest);
    }

    #[test]
    fn test_custom_conventions() {
        let options = FinderOptions {
            conventions: Conventions {
                test_prefix: "Check".to_string(),
                context_type: "C".to_string(),
                run_method: "Sub".to_string(),
            },
            ..FinderOptions::default()
        };
        let source = "package p\n\nfunc CheckA(c *check.C) {\n\tc.Sub(\"x\", nil)\n\tc.Run(\"y\", nil)\n}\n\nfunc TestB(t *testing.T) {}\n";
        let forest = find_tests_in_source("p", "/p/a_test.go", source, &options).unwrap();
        let names: Vec<&str> = forest.iter().map(|n| n.full_name.as_str()).collect();
        assert_eq!(names, vec!["CheckA", "CheckA/x"]);
    }
}
