//! Source loading: turns a directory, package patterns and build tags into
//! parsed Go test files grouped by package.

pub mod config;
pub mod constraints;
pub mod loader;
pub mod module;
pub mod parser;
pub mod patterns;

pub use constraints::BuildContext;
pub use loader::{parse_source, GoPackageLoader, LoadRequest, Package, PackageLoader, SourceFile};
pub use module::GoModule;
