//! listests
//!
//! Static discovery of Go tests and subtests. Test files are parsed with
//! tree-sitter, `TestXxx(t *testing.T)` functions are recognized and the
//! `t.Run` calls inside them are resolved to named subtests, including
//! table-driven ones, each with its exact source range.
pub mod cancel;
pub mod cli;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod tree;
pub mod utils;

pub use cancel::CancelToken;
pub use discovery::{LoadRequest, Package};
pub use engine::{find_tests, find_tests_in_source, CallbackPolicy, FinderOptions, TestStream};
pub use error::{Error, Result};
pub use tree::{Forest, SourcePosition, SourceRange, TestNode};
