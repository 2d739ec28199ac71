// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Defines known embeddable Python distributions.

use {
    crate::{
        environment::Settings,
        error::Result,
        http::{fetch_cached, RemoteContent},
        version::PythonVersion,
    },
    log::warn,
    once_cell::sync::Lazy,
    std::{collections::BTreeMap, path::PathBuf},
};

/// Last patch release of a `(major, minor)` series that shipped Windows binaries.
///
/// Later patch releases of these series are source-only security releases.
/// A virtualenv created from one of them is served the embeddable
/// distribution of the last release that has one.
static LAST_BINARY_RELEASES: Lazy<BTreeMap<(u32, u32), u32>> = Lazy::new(|| {
    let mut res = BTreeMap::new();

    res.insert((3, 5), 4);
    res.insert((3, 6), 8);
    res.insert((3, 7), 9);
    res.insert((3, 8), 10);
    res.insert((3, 9), 13);
    res.insert((3, 10), 11);
    res.insert((3, 11), 9);
    res.insert((3, 12), 10);

    res
});

/// The version whose embeddable distribution is used for a Python version.
pub fn artifact_version(version: &PythonVersion) -> PythonVersion {
    match LAST_BINARY_RELEASES.get(&(version.major, version.minor)) {
        Some(last) if version.patch > *last => {
            PythonVersion::new(version.major, version.minor, *last)
        }
        _ => *version,
    }
}

/// Describes an embeddable Python distribution zip file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmbeddableDistribution {
    /// Version of the distribution that is fetched.
    pub version: PythonVersion,

    /// Architecture tag, e.g. `amd64`.
    pub arch: String,
}

impl EmbeddableDistribution {
    /// Resolve the distribution to use for a Python version.
    pub fn for_version(version: &PythonVersion, arch: &str) -> Self {
        let resolved = artifact_version(version);

        if resolved != *version {
            warn!(
                "Python {} has no embeddable distribution; using {}",
                version, resolved
            );
        }

        Self {
            version: resolved,
            arch: arch.to_string(),
        }
    }

    /// File name of the distribution, e.g. `python-3.9.2-embed-amd64.zip`.
    pub fn filename(&self) -> String {
        format!("python-{}-embed-{}.zip", self.version, self.arch)
    }

    /// URL of the distribution relative to a download site.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.version,
            self.filename()
        )
    }

    pub fn remote_content(&self, base_url: &str) -> RemoteContent {
        RemoteContent {
            filename: self.filename(),
            url: self.url(base_url),
        }
    }
}

/// Obtain a local path to the embeddable distribution matching a Python version.
pub fn fetch_embeddable_python(settings: &Settings, version: &PythonVersion) -> Result<PathBuf> {
    let dist = EmbeddableDistribution::for_version(version, &settings.arch);
    let cache_dir = settings.ensure_cache_dir()?;

    let path = fetch_cached(
        &dist.remote_content(&settings.python_ftp_url),
        cache_dir,
        &settings.user_agent,
    )?;

    warn!("embeddable Python available at {}", path.display());

    Ok(path)
}

/// Obtain a local path to `get-pip.py`.
pub fn fetch_get_pip(settings: &Settings) -> Result<PathBuf> {
    let cache_dir = settings.ensure_cache_dir()?;

    fetch_cached(
        &RemoteContent {
            filename: "get-pip.py".to_string(),
            url: settings.get_pip_url.clone(),
        },
        cache_dir,
        &settings.user_agent,
    )
}
