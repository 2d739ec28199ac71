// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*!
Project descriptors.

A project is a directory containing a `pkvenv.json` file describing what
to package.
*/

use {
    crate::{
        environment::canonicalize_path,
        error::{PkvenvError, Result},
    },
    serde::Deserialize,
    std::{
        fmt::Display,
        path::{Path, PathBuf},
        str::FromStr,
    },
};

/// Name of the project descriptor file inside a project directory.
pub const CONFIG_FILE_NAME: &str = "pkvenv.json";

/// The descriptor file as written on disk.
///
/// Every field is optional here so a missing field can be reported by name.
#[derive(Debug, Default, Deserialize)]
struct RawDescriptor {
    name: Option<String>,
    #[serde(alias = "args")]
    entry_point: Option<String>,
    #[serde(alias = "venv_path")]
    venv: Option<String>,
    include: Option<Vec<String>>,
    #[serde(default)]
    gui: bool,
}

/// A `module:function` reference to the application's main function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryPoint {
    /// Dotted module path, e.g. `app.cli`.
    pub module: String,

    /// Function in `module` to call.
    pub function: String,
}

impl FromStr for EntryPoint {
    type Err = PkvenvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PkvenvError::InvalidEntryPoint(s.to_string());

        let (module, function) = s.trim().split_once(':').ok_or_else(invalid)?;
        let (module, function) = (module.trim(), function.trim());

        if module.is_empty()
            || function.is_empty()
            || module.split('.').any(|part| part.is_empty())
            || function.contains(':')
        {
            return Err(invalid());
        }

        Ok(Self {
            module: module.to_string(),
            function: function.to_string(),
        })
    }
}

impl Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.module, self.function)
    }
}

/// A path to include in the bundle, classified when the project is loaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IncludePath {
    /// A regular file.
    File(PathBuf),

    /// A directory, copied recursively.
    Directory(PathBuf),

    /// Anything else, including paths that don't exist.
    Unsupported(PathBuf),
}

impl IncludePath {
    /// Classify a filesystem path.
    pub fn classify(path: PathBuf) -> Self {
        if path.is_file() {
            Self::File(path)
        } else if path.is_dir() {
            Self::Directory(path)
        } else {
            Self::Unsupported(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::File(p) | Self::Directory(p) | Self::Unsupported(p) => p,
        }
    }
}

/// A loaded and validated project descriptor.
#[derive(Clone, Debug)]
pub struct ProjectDescriptor {
    /// Absolute path of the project directory.
    pub project_dir: PathBuf,

    /// Base name of output artifacts.
    pub name: String,

    /// Function the launcher runs.
    pub entry_point: EntryPoint,

    /// Absolute path of the source virtualenv.
    pub venv_path: PathBuf,

    /// Paths to copy into the bundle, in declaration order.
    pub include: Vec<IncludePath>,

    /// Whether the launcher should run without a console window.
    pub gui: bool,
}

impl ProjectDescriptor {
    /// Load the descriptor of a project directory.
    pub fn from_project_dir(project_dir: &Path) -> Result<Self> {
        if !project_dir.is_dir() {
            return Err(PkvenvError::ProjectDirectoryMissing(
                project_dir.to_path_buf(),
            ));
        }

        let project_dir =
            canonicalize_path(project_dir).map_err(PkvenvError::io_path(project_dir))?;
        let config_path = project_dir.join(CONFIG_FILE_NAME);

        if !config_path.is_file() {
            return Err(PkvenvError::ConfigFileMissing(config_path));
        }

        let data = std::fs::read(&config_path).map_err(PkvenvError::io_path(&config_path))?;
        let raw: RawDescriptor = serde_json::from_slice(&data)
            .map_err(|e| PkvenvError::ConfigParse(config_path.clone(), e))?;

        Self::from_raw(&project_dir, raw)
    }

    fn from_raw(project_dir: &Path, raw: RawDescriptor) -> Result<Self> {
        let name = raw.name.ok_or(PkvenvError::MissingField("name"))?;
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(PkvenvError::InvalidName(name));
        }
        let entry_point = raw
            .entry_point
            .ok_or(PkvenvError::MissingField("entry_point"))?;
        let venv = raw.venv.ok_or(PkvenvError::MissingField("venv"))?;
        let include = raw.include.ok_or(PkvenvError::MissingField("include"))?;

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            name,
            entry_point: entry_point.parse()?,
            venv_path: project_dir.join(venv),
            include: include
                .iter()
                .map(|item| IncludePath::classify(project_dir.join(item)))
                .collect(),
            gui: raw.gui,
        })
    }

    /// Directory build output is written to.
    pub fn build_dir(&self) -> PathBuf {
        self.project_dir.join("build")
    }

    /// Directory the application tree is assembled in.
    pub fn output_path(&self) -> PathBuf {
        self.build_dir().join("pkvenv")
    }

    /// Path of the distributable archive.
    pub fn archive_path(&self) -> PathBuf {
        self.build_dir().join(format!("{}.zip", self.name))
    }
}
