// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Python version strings. */

use {
    crate::error::PkvenvError,
    std::{fmt::Display, str::FromStr},
};

/// A `major.minor.patch` Python version.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PythonVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// The `XY` form used in distribution file names, e.g. `38` for 3.8.
    pub fn major_minor_tag(&self) -> String {
        format!("{}{}", self.major, self.minor)
    }
}

impl FromStr for PythonVersion {
    type Err = PkvenvError;

    /// Parse a version string.
    ///
    /// The string must contain a `.`. Two or three components are accepted
    /// and missing trailing components are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PkvenvError::InvalidVersion(s.to_string());

        if !s.contains('.') {
            return Err(invalid());
        }

        let components = s
            .split('.')
            .map(|c| c.trim().parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        match components.as_slice() {
            [major, minor, patch] => Ok(Self::new(*major, *minor, *patch)),
            [major, minor] => Ok(Self::new(*major, *minor, 0)),
            _ => Err(invalid()),
        }
    }
}

impl Display for PythonVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
