// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolve details about the pkvenv execution environment.

use {
    crate::error::{PkvenvError, Result},
    std::path::{Path, PathBuf},
};

pub const PKVENV_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default location embeddable Python distributions are fetched from.
pub const PYTHON_FTP_URL: &str = "https://www.python.org/ftp/python";

/// Location of the script used to bootstrap pip into a distribution.
pub const GET_PIP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";

/// Name of the download cache directory under the user's home directory.
const CACHE_DIR_NAME: &str = ".pkvenv";

/// Environment variable overriding the download cache directory.
pub const CACHE_DIR_ENV: &str = "PKVENV_CACHE_DIR";

/// Environment variable overriding the directory holding launcher stubs.
pub const LAUNCHER_DIR_ENV: &str = "PKVENV_LAUNCHER_DIR";

pub fn canonicalize_path(path: &Path) -> Result<PathBuf, std::io::Error> {
    let mut p = path.canonicalize()?;

    // Strip \\?\ prefix on Windows and replace \ with /, which is valid.
    if cfg!(windows) {
        let mut s = p.display().to_string().replace('\\', "/");
        if s.starts_with("//?/") {
            s = s[4..].to_string();
        }

        p = PathBuf::from(s);
    }

    Ok(p)
}

/// Architecture tag of embeddable distributions matching the running binary.
pub fn default_arch_tag() -> &'static str {
    if cfg!(target_arch = "x86") {
        "win32"
    } else if cfg!(target_arch = "aarch64") {
        "arm64"
    } else {
        "amd64"
    }
}

/// Settings that apply to a whole packaging run.
///
/// Every stage receives these explicitly. Nothing reads process-wide state
/// after the instance is constructed, which lets tests point the download
/// cache and launcher stubs at temporary directories.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Directory holding downloaded interpreter archives and `get-pip.py`.
    pub cache_dir: PathBuf,

    /// User agent sent with HTTP requests.
    pub user_agent: String,

    /// Base URL of the embeddable distribution download site.
    pub python_ftp_url: String,

    /// URL of `get-pip.py`.
    pub get_pip_url: String,

    /// Architecture tag of the embeddable distribution (`amd64`, `win32`, `arm64`).
    pub arch: String,

    /// Directory containing precompiled launcher stubs.
    pub launcher_dir: Option<PathBuf>,
}

impl Settings {
    /// Construct an instance with default values rooted at a cache directory.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            user_agent: format!("pkvenv/{}", PKVENV_VERSION),
            python_ftp_url: PYTHON_FTP_URL.to_string(),
            get_pip_url: GET_PIP_URL.to_string(),
            arch: default_arch_tag().to_string(),
            launcher_dir: None,
        }
    }

    /// Resolve settings from the user's home directory and environment variables.
    pub fn from_env() -> Result<Self> {
        let cache_dir = match std::env::var_os(CACHE_DIR_ENV) {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .ok_or(PkvenvError::HomeDirUnknown)?
                .join(CACHE_DIR_NAME),
        };

        let launcher_dir = match std::env::var_os(LAUNCHER_DIR_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|p| p.to_path_buf())),
        };

        Ok(Self {
            launcher_dir,
            ..Self::new(cache_dir)
        })
    }

    /// Obtain the download cache directory, creating it if necessary.
    pub fn ensure_cache_dir(&self) -> Result<&Path> {
        if self.cache_dir.exists() {
            if !self.cache_dir.is_dir() {
                return Err(PkvenvError::CacheDirInvalid(self.cache_dir.clone()));
            }
        } else {
            std::fs::create_dir_all(&self.cache_dir)
                .map_err(PkvenvError::io_path(&self.cache_dir))?;
        }

        Ok(&self.cache_dir)
    }
}
