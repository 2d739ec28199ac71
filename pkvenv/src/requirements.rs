// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*!
Reconciliation of frozen dependency lists.

`pip freeze` output from the source virtualenv is turned into a list of
requirements that can be reinstalled into the embedded distribution.
*/

use {
    crate::error::{PkvenvError, Result},
    log::debug,
    std::{fmt::Display, io::Write, path::Path},
};

/// Name of the packaging tool. It is bootstrapped separately and never reinstalled.
const PACKAGING_TOOL: &str = "pip";

/// A single record of a frozen dependency list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Requirement {
    /// `name==version`.
    Pinned { name: String, version: String },

    /// Anything pip can install that isn't a plain pin.
    ///
    /// This covers direct references (`name @ file:///...`) and editable
    /// installs, whose `-e ` prefix has been stripped.
    Reference(String),
}

impl Requirement {
    /// Parse a single line of `pip freeze` output.
    ///
    /// Returns `None` for lines that don't describe an installable requirement.
    pub fn from_freeze_line(line: &str) -> Option<Self> {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        if let Some(target) = line.strip_prefix("-e ") {
            let target = target.trim();
            return if target.is_empty() {
                None
            } else {
                Some(Self::Reference(target.to_string()))
            };
        }

        if line.contains(" @ ") {
            return Some(Self::Reference(line.to_string()));
        }

        match line.split("==").collect::<Vec<_>>().as_slice() {
            [name, version] if !name.trim().is_empty() && !version.trim().is_empty() => {
                Some(Self::Pinned {
                    name: name.trim().to_string(),
                    version: version.trim().to_string(),
                })
            }
            _ => None,
        }
    }

    /// Whether this requirement names the packaging tool itself.
    pub fn is_packaging_tool(&self) -> bool {
        let name = match self {
            Self::Pinned { name, .. } => name.as_str(),
            Self::Reference(value) => match value.split_once(" @ ") {
                Some((name, _)) => name.trim(),
                None => return false,
            },
        };

        normalize_name(name) == PACKAGING_TOOL
    }
}

impl Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pinned { name, version } => write!(f, "{}=={}", name, version),
            Self::Reference(value) => f.write_str(value),
        }
    }
}

/// Normalize a distribution name per PEP 503.
fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(['_', '.'], "-")
}

/// Turn `pip freeze` output into the requirements to reinstall.
pub fn parse_freeze_output(output: &str) -> Vec<Requirement> {
    output
        .lines()
        .filter_map(|line| {
            let res = Requirement::from_freeze_line(line);
            if res.is_none() && !line.trim().is_empty() {
                debug!("ignoring freeze line: {}", line);
            }
            res
        })
        .filter(|r| !r.is_packaging_tool())
        .collect()
}

/// Write requirements to a `requirements.txt` style file.
pub fn write_requirements_file(requirements: &[Requirement], path: &Path) -> Result<()> {
    let mut fh = std::fs::File::create(path).map_err(PkvenvError::io_path(path))?;

    for requirement in requirements {
        writeln!(fh, "{}", requirement).map_err(PkvenvError::io_path(path))?;
    }

    Ok(())
}
