use std::path::PathBuf;

use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;

use crate::discovery::LoadRequest;
use crate::engine::{CallbackPolicy, FinderOptions};
use crate::logging::Verbosity;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "listests")]
#[command(
    about = "List Go tests and subtests with their source locations",
    long_about = "List Go tests and subtests with their source locations.\n\n\
                  If no packages are given, the package in the current directory (./.) is used."
)]
pub struct Args {
    /// Packages to search, e.g. ./... or ./pkg/foo
    #[arg(value_name = "PACKAGES")]
    pub patterns: Vec<String>,

    /// Comma-separated list of build tags to apply
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Directory to run in
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Output in ripgrep's vimgrep format
    #[arg(long, conflicts_with_all = ["format", "json"])]
    pub vimgrep: bool,

    /// Output template, e.g. '{{.Package}} {{.FullName}}'
    #[arg(short = 'f', long, value_name = "TEMPLATE", conflicts_with = "json")]
    pub format: Option<String>,

    /// Print the test tree as JSON
    #[arg(long)]
    pub json: bool,

    /// Which table entries subtests of a table callback attach to
    #[arg(long, value_enum, default_value_t = CallbackPolicy::Last)]
    pub callbacks: CallbackPolicy,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if !self.dir.is_dir() {
            anyhow::bail!("Directory does not exist: {}", self.dir.display());
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            anyhow::bail!("Empty build tag in --tags");
        }
        Ok(())
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    pub fn load_request(&self) -> LoadRequest {
        LoadRequest::new(&self.dir)
            .with_patterns(self.patterns.iter().cloned())
            .with_build_tags(self.tags.iter().map(|t| t.trim().to_string()))
    }

    pub fn finder_options(&self) -> FinderOptions {
        FinderOptions {
            callbacks: self.callbacks,
            ..FinderOptions::default()
        }
    }

    /// Parses the selected format up front so template errors are reported
    /// before any package is loaded.
    pub fn output_format(&self) -> Result<OutputFormat> {
        let format = if self.json {
            OutputFormat::Json
        } else if self.vimgrep {
            OutputFormat::vimgrep()?
        } else if let Some(template) = &self.format {
            OutputFormat::template(template).context("Failed to parse format")?
        } else {
            OutputFormat::names()?
        };
        Ok(format)
    }
}
