// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {std::path::PathBuf, thiserror::Error};

/// Errors that can occur while packaging a virtualenv.
#[derive(Debug, Error)]
pub enum PkvenvError {
    #[error("project directory({}) does not exist or is not a directory", .0.display())]
    ProjectDirectoryMissing(PathBuf),

    #[error("config file({}) does not exist", .0.display())]
    ConfigFileMissing(PathBuf),

    #[error("can not parse config file {}: {1}", .0.display())]
    ConfigParse(PathBuf, serde_json::Error),

    #[error("`{0}` is missing in config file")]
    MissingField(&'static str),

    #[error("invalid name `{0}`; it must be a plain file name")]
    InvalidName(String),

    #[error("include {} uses a name reserved for generated files", .0.display())]
    ReservedIncludeName(PathBuf),

    #[error("invalid entry point `{0}`; expected `module:function`")]
    InvalidEntryPoint(String),

    #[error("{} does not exist", .0.display())]
    VenvConfigMissing(PathBuf),

    #[error("can not find python version in venv config file {}", .0.display())]
    VersionMissing(PathBuf),

    #[error("invalid python version {0}")]
    InvalidVersion(String),

    #[error("python executable not found in {}", .0.display())]
    PythonNotFound(PathBuf),

    #[error("cache dir {} exists but is not a directory", .0.display())]
    CacheDirInvalid(PathBuf),

    #[error("could not resolve home directory")]
    HomeDirUnknown,

    #[error("HTTP error fetching {0}: {1}")]
    Http(String, reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("`{command}` failed ({status}):\n{output}")]
    Subprocess {
        command: String,
        status: String,
        output: String,
    },

    #[error("can not find python._pth file in {}", .0.display())]
    PthFileMissing(PathBuf),

    #[error("archive member {0} has an unsafe path")]
    UnsafeArchivePath(String),

    #[error("zip error in {}: {1}", .0.display())]
    Zip(PathBuf, zip::result::ZipError),

    #[error("template error: {0}")]
    Template(String),

    #[error("I/O error on {}: {1}", .0.display())]
    IoPath(PathBuf, std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PkvenvError {
    /// Construct a closure that annotates an I/O error with a path.
    pub fn io_path(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |e| Self::IoPath(path, e)
    }
}

/// Result type for this crate.
pub type Result<T, E = PkvenvError> = std::result::Result<T, E>;
