//! Rendering of discovered tests: template lines or JSON.

pub mod formatter;
pub mod template;

pub use formatter::{OutputFormat, OutputFormatter, DEFAULT_FORMAT, VIMGREP_FORMAT};
pub use template::{Template, TemplateRecord, KNOWN_FIELDS};
