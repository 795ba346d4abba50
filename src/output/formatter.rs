use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::engine::PackageTests;
use crate::error::{OutputError, Result};
use crate::tree::{Forest, TestNode};

use super::template::{Template, TemplateRecord};

pub const DEFAULT_FORMAT: &str = "{{.FullName}}";

/// Format of ripgrep's `--vimgrep` output, understood by editors' quickfix
/// lists.
pub const VIMGREP_FORMAT: &str =
    "{{.RelativeFileName}}:{{.Range.Start.Line}}:{{.Range.Start.Column}}:{{.Package}}:{{.FullName}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// One rendered line per test, in pre-order.
    Lines(Template),
    /// The whole forest as a JSON array.
    Json,
}

impl OutputFormat {
    pub fn names() -> Result<Self> {
        Self::template(DEFAULT_FORMAT)
    }

    pub fn vimgrep() -> Result<Self> {
        Self::template(VIMGREP_FORMAT)
    }

    pub fn template(source: &str) -> Result<Self> {
        Ok(Self::Lines(Template::parse(source)?))
    }
}

/// Writes discovered tests. Relative paths in templates are resolved
/// against `base`.
pub struct OutputFormatter {
    format: OutputFormat,
    base: PathBuf,
    cancel: CancelToken,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, base: impl Into<PathBuf>) -> Self {
        Self {
            format,
            base: base.into(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Renders one test with a line format. `None` for JSON output.
    pub fn format_node(&self, node: &TestNode) -> Result<Option<String>> {
        let OutputFormat::Lines(template) = &self.format else {
            return Ok(None);
        };
        let record = TemplateRecord::new(node, &self.base).to_value()?;
        Ok(Some(template.render(&record)?))
    }

    /// Writes every test the packages produce and returns how many were
    /// written. Line output is flushed package by package; JSON output is
    /// written once all packages are done.
    pub fn write_all<W, I>(&self, out: &mut W, packages: I) -> Result<usize>
    where
        W: Write,
        I: IntoIterator<Item = PackageTests>,
    {
        match &self.format {
            OutputFormat::Lines(_) => {
                let mut written = 0;
                for package in packages {
                    written += self.write_lines(out, &package.forest)?;
                    out.flush().map_err(OutputError::from)?;
                }
                Ok(written)
            }
            OutputFormat::Json => {
                let mut forest = Forest::default();
                for package in packages {
                    forest.extend(package.forest);
                }
                let count = forest.len();
                serde_json::to_writer_pretty(&mut *out, forest.roots())
                    .map_err(OutputError::from)?;
                writeln!(out).map_err(OutputError::from)?;
                debug!(tests = count, "wrote json");
                Ok(count)
            }
        }
    }

    fn write_lines<W: Write>(&self, out: &mut W, forest: &Forest) -> Result<usize> {
        let mut written = 0;
        for node in forest.iter_until(self.cancel.clone()) {
            if let Some(line) = self.format_node(node)? {
                writeln!(out, "{line}").map_err(OutputError::from)?;
                written += 1;
            }
        }
        Ok(written)
    }
}
