// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Inspection of source virtualenvs. */

use {
    crate::{
        error::{PkvenvError, Result},
        package_manager::PackageManagerFactory,
        requirements::Requirement,
        version::PythonVersion,
    },
    std::{
        collections::BTreeMap,
        path::{Path, PathBuf},
    },
};

/// Name of the metadata file at the root of a virtualenv.
pub const VENV_CONFIG_FILE: &str = "pyvenv.cfg";

/// Parsed content of a `pyvenv.cfg` file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VenvConfig {
    pub values: BTreeMap<String, String>,
}

impl VenvConfig {
    /// Parse `key = value` lines.
    ///
    /// Lines not containing exactly one `=` are ignored.
    pub fn parse(data: &str) -> Self {
        let values = data
            .lines()
            .filter_map(|line| match line.split('=').collect::<Vec<_>>().as_slice() {
                [key, value] => Some((key.trim().to_string(), value.trim().to_string())),
                _ => None,
            })
            .collect();

        Self { values }
    }

    /// Read `pyvenv.cfg` from a virtualenv directory.
    pub fn from_venv(venv_path: &Path) -> Result<Self> {
        let path = venv_path.join(VENV_CONFIG_FILE);

        if !path.exists() {
            return Err(PkvenvError::VenvConfigMissing(path));
        }

        let data = std::fs::read_to_string(&path).map_err(PkvenvError::io_path(&path))?;

        Ok(Self::parse(&data))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// The raw `version` value.
    pub fn version_str(&self) -> Option<&str> {
        self.get("version")
    }
}

/// Find a Python executable in a directory, trying candidate names in order.
pub fn find_python_exe(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Resolve the Python executable of a virtualenv.
///
/// Windows virtualenvs keep it in `Scripts`, POSIX ones in `bin`.
pub fn venv_python_exe(venv_path: &Path) -> Result<PathBuf> {
    find_python_exe(&venv_path.join("Scripts"), &["python.exe"])
        .or_else(|| find_python_exe(&venv_path.join("bin"), &["python3", "python"]))
        .ok_or_else(|| PkvenvError::PythonNotFound(venv_path.to_path_buf()))
}

/// Facts about a source virtualenv needed to rebuild it.
#[derive(Clone, Debug)]
pub struct VirtualEnvironment {
    /// Root directory of the virtualenv.
    pub path: PathBuf,

    /// Parsed `pyvenv.cfg`.
    pub config: VenvConfig,

    /// Python version the virtualenv was created with.
    pub version: PythonVersion,

    /// Path to the virtualenv's Python executable.
    pub python_exe: PathBuf,
}

impl VirtualEnvironment {
    /// Inspect a virtualenv directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let config = VenvConfig::from_venv(path)?;

        let version = config
            .version_str()
            .ok_or_else(|| PkvenvError::VersionMissing(path.join(VENV_CONFIG_FILE)))?
            .parse::<PythonVersion>()?;

        let python_exe = venv_python_exe(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            config,
            version,
            python_exe,
        })
    }

    /// Obtain the requirements installed in this virtualenv.
    pub fn requirements(&self, factory: &dyn PackageManagerFactory) -> Result<Vec<Requirement>> {
        factory.package_manager(&self.python_exe).freeze()
    }
}
