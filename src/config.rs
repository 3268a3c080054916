//! Run configuration read from a `trellis.toml` file.
//!
//! ```toml
//! ver = "0.1.0"
//! include = "Calculator.*"
//! exclude = ".*slow.*"
//! order = "name"
//! jobs = 4
//! parallel = "classes"
//! ```
use crate::{
    errors::Error,
    executor::Computer,
    manipulation::{self, Filter, Sorter},
    model::TestClass,
    request::Request,
};
use regex::Regex;
use serde::Deserialize;
use std::{path::Path, sync::Arc};

/// Order in which sibling tests run.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Order {
    /// Declaration order.
    #[default]
    Declaration,
    /// Ascending by display name.
    Name,
    /// Descending by display name.
    ReverseName,
}

/// Which containers run their children concurrently.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Parallel {
    #[default]
    None,
    /// Members of suites.
    Classes,
    /// Methods of test cases.
    Methods,
    Both,
}

/// Configuration for a single trellis run.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Version of trellis this configuration is compatible with.
    pub ver: String,
    /// Only run tests whose display name matches.
    pub include: Option<String>,
    /// Skip tests whose display name matches.
    pub exclude: Option<String>,
    #[serde(default)]
    pub order: Order,
    /// Worker threads shared by every parallel container. Defaults to the
    /// number of CPUs.
    pub jobs: Option<usize>,
    #[serde(default)]
    pub parallel: Parallel,
}

impl Config {
    /// Create a configuration by reading a `trellis.toml` file from
    /// `conf_dir`.
    /// Ensures that the version number specified in the file matches the
    /// version of this crate.
    pub fn from_path(conf_dir: &Path) -> Result<Self, Error> {
        let conf_path = conf_dir.join("trellis.toml");
        let contents = std::fs::read_to_string(&conf_path).map_err(|_| {
            Error::Config(format!(
                "{} is missing. trellis expects a directory with a \
                 trellis.toml file.",
                conf_path.display()
            ))
        })?;
        Self::from_str(&contents).map_err(|err| {
            Error::Config(format!(
                "Failed to parse {}: {}",
                conf_path.display(),
                err
            ))
        })
    }

    /// Parse a configuration and check its version.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, Error> {
        let conf: Config = toml::from_str(contents)
            .map_err(|err| Error::Config(err.to_string()))?;

        if env!("CARGO_PKG_VERSION") != conf.ver {
            return Err(Error::Config(format!(
                "trellis version mismatch. Configuration requires: {}, \
                 library version: {}.",
                conf.ver,
                env!("CARGO_PKG_VERSION")
            )));
        }

        Ok(conf)
    }

    /// The include/exclude filter, if either pattern is set.
    pub fn filter(&self) -> Result<Option<Arc<dyn Filter>>, Error> {
        if self.include.is_none() && self.exclude.is_none() {
            return Ok(None);
        }
        let include = self.include.as_deref().map(Regex::new).transpose()?;
        let exclude = self.exclude.as_deref().map(Regex::new).transpose()?;
        Ok(Some(manipulation::name_pattern(include, exclude)))
    }

    pub fn sorter(&self) -> Sorter {
        match self.order {
            Order::Declaration => Sorter::none(),
            Order::Name => Sorter::by_name(),
            Order::ReverseName => Sorter::by_name().reversed(),
        }
    }

    pub fn computer(&self) -> Result<Computer, Error> {
        let (classes, methods) = match self.parallel {
            Parallel::None => return Ok(Computer::serial()),
            Parallel::Classes => (true, false),
            Parallel::Methods => (false, true),
            Parallel::Both => (true, true),
        };
        match self.jobs {
            Some(jobs) => Computer::parallel_with(classes, methods, jobs),
            None => Computer::parallel(classes, methods),
        }
    }

    /// A request over `classes` with this configuration's computer, filter
    /// and order.
    pub fn request(
        &self,
        classes: impl IntoIterator<Item = Arc<TestClass>>,
    ) -> Result<Request, Error> {
        let mut request = Request::classes(&self.computer()?, classes);
        if let Some(filter) = self.filter()? {
            request = request.filter_with(filter);
        }
        Ok(request.sort_with(self.sorter()))
    }
}
