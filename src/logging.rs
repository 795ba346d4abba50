use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Diagnostic output level. Variants are declared from least to most chatty
/// so the derived ordering can be used for threshold checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// `-q`: nothing at all, not even skipped-node warnings.
    Quiet,
    /// Warnings about `Run` calls whose subtest could not be created.
    Normal,
    /// `-v`: the discovery start and the directory searched.
    Verbose,
    /// `-vv`: one event per parsed file and per finished package, with
    /// source locations.
    Debug,
    /// `-vvv`: every recognized test and each table resolution step.
    Trace,
}

impl Verbosity {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    fn to_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn to_filter(self) -> String {
        let level = self.to_level();
        format!("{}={level}", env!("CARGO_CRATE_NAME"))
    }
}

/// Installs the global subscriber. Diagnostics always go to stderr so that
/// stdout carries only the test listing.
pub fn init(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.to_filter()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(verbosity >= Verbosity::Debug)
        .with_line_number(verbosity >= Verbosity::Debug)
        .compact();

    match verbosity {
        Verbosity::Quiet => {
            subscriber.with_writer(std::io::sink).init();
        }
        Verbosity::Normal => {
            subscriber.with_writer(std::io::stderr).without_time().init();
        }
        _ => {
            subscriber.with_writer(std::io::stderr).init();
        }
    }
}
