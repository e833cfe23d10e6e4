//! Compiler settings read from a task document:
//!
//! ```text
//! basis
//! V: Nj
//! W: Ni
//! logging
//! loglevel: info
//! normalization
//! simplify: true
//! ```
//!
//! Every section is optional. `basis` maps space names to basis-function names, `logging`
//! sets the terminal log level and `normalization` switches constant folding of the result.

use crate::Utils::logger::{init_logger, parse_log_level};
use crate::Utils::task_parser::{DocumentMap, Value, parse_document_as};
use crate::fem::calculus::DEFAULT_COEFFICIENTS;
use crate::fem::errors::FormError;
use crate::fem::normalize::{BasisNames, Normalizer};
use crate::fem::space::FunctionSpace;
use log::warn;
use simplelog::LevelFilter;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct CompilerConfig {
    pub loglevel: LevelFilter,
    /// space name -> basis-function name
    pub basis: BTreeMap<String, String>,
    pub simplify: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            loglevel: LevelFilter::Info,
            basis: BTreeMap::new(),
            simplify: false,
        }
    }
}

/// the single value stored under `section.key`, if present
fn single_value<'a>(
    document: &'a DocumentMap,
    section: &str,
    key: &str,
) -> Result<Option<&'a Value>, FormError> {
    let Some(values) = document.get(section).and_then(|s| s.get(key)).and_then(|v| v.as_ref())
    else {
        return Ok(None);
    };
    match values.as_slice() {
        [value] => Ok(Some(value)),
        _ => Err(FormError::Config(format!(
            "{}.{} expects exactly one value, got {}",
            section,
            key,
            values.len()
        ))),
    }
}

impl FromStr for CompilerConfig {
    type Err = FormError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let document = parse_document_as(input, None).map_err(FormError::Config)?;
        let mut config = CompilerConfig::default();

        for section in document.keys() {
            if !matches!(section.as_str(), "basis" | "logging" | "normalization") {
                warn!("unknown configuration section `{}` ignored", section);
            }
        }

        if let Some(basis) = document.get("basis") {
            for space in basis.keys() {
                let name = match single_value(&document, "basis", space)? {
                    Some(Value::String(name)) => name.clone(),
                    other => {
                        return Err(FormError::Config(format!(
                            "basis name for space `{}` must be a symbol, got {:?}",
                            space, other
                        )));
                    }
                };
                config.basis.insert(space.clone(), name);
            }
        }

        if let Some(value) = single_value(&document, "logging", "loglevel")? {
            let level = value.to_string();
            config.loglevel = parse_log_level(&level).ok_or_else(|| {
                FormError::Config(format!(
                    "loglevel must be off, error, warn, info, debug or trace, got `{}`",
                    level
                ))
            })?;
        }

        if let Some(value) = single_value(&document, "normalization", "simplify")? {
            config.simplify = value.as_boolean().ok_or_else(|| {
                FormError::Config(format!("simplify must be true or false, got `{}`", value))
            })?;
        }
        Ok(config)
    }
}

impl CompilerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| FormError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        content.parse()
    }

    /// Basis-name map for the given spaces, matched by space name.
    pub fn basis_map(&self, spaces: &[FunctionSpace]) -> BasisNames {
        for name in self.basis.keys() {
            if !spaces.iter().any(|s| s.name() == name) {
                warn!("basis name given for unknown space `{}`", name);
            }
        }
        spaces
            .iter()
            .filter_map(|space| {
                self.basis
                    .get(space.name())
                    .map(|name| (space.clone(), name.clone()))
            })
            .collect()
    }

    /// Normalizer over the default coefficient registry with these settings.
    pub fn normalizer<'r>(&self, names: &'r BasisNames) -> Normalizer<'r> {
        Normalizer::new(&DEFAULT_COEFFICIENTS)
            .with_names(names)
            .with_simplify(self.simplify)
    }

    /// Installs the terminal logger at the configured level.
    pub fn init_logging(&self) -> bool {
        init_logger(self.loglevel)
    }
}
