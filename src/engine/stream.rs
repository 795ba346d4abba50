use std::path::PathBuf;

use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::discovery::Package;
use crate::tree::Forest;

use super::finder::TestFinder;

/// The tests of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTests {
    pub package: String,
    pub directory: PathBuf,
    pub forest: Forest,
}

/// Pull-based producer: each `next` walks one loaded package. Packages
/// without tests are passed over. Once the token is cancelled no further
/// package is walked.
#[derive(Debug)]
pub struct TestStream {
    packages: std::vec::IntoIter<Package>,
    finder: TestFinder,
    cancel: CancelToken,
}

impl TestStream {
    pub fn new(packages: Vec<Package>, finder: TestFinder, cancel: CancelToken) -> Self {
        Self {
            packages: packages.into_iter(),
            finder,
            cancel,
        }
    }

    /// Drains the stream into one sorted forest.
    pub fn into_forest(self) -> Forest {
        let mut forest = Forest::default();
        for package in self {
            forest.extend(package.forest);
        }
        forest
    }
}

impl Iterator for TestStream {
    type Item = PackageTests;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancel.is_cancelled() {
                debug!("interrupted, stopping");
                self.packages = Vec::new().into_iter();
                return None;
            }

            let package = self.packages.next()?;
            let forest = self.finder.find_in_package(&package);
            if forest.is_empty() {
                trace!(package = %package.id, "no tests");
                continue;
            }
            return Some(PackageTests {
                package: package.id,
                directory: package.directory,
                forest,
            });
        }
    }
}
