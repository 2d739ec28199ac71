// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! HTTP retrieval into the download cache. */

use {
    crate::error::{PkvenvError, Result},
    log::warn,
    std::path::{Path, PathBuf},
    url::Url,
};

/// Describes content available at a URL.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteContent {
    /// Filename the content is stored under in the download cache.
    pub filename: String,

    /// URL the content is fetched from.
    pub url: String,
}

/// Obtain an HTTP client, taking proxy environment variables into account.
pub fn get_http_client(user_agent: &str) -> reqwest::Result<reqwest::blocking::Client> {
    let mut builder = reqwest::blocking::ClientBuilder::new().user_agent(user_agent);

    for (key, value) in std::env::vars() {
        let key = key.to_lowercase();
        if key.ends_with("_proxy") {
            let end = key.len() - "_proxy".len();
            let schema = &key[..end];

            if let Ok(url) = Url::parse(&value) {
                if let Some(Ok(proxy)) = match schema {
                    "http" => Some(reqwest::Proxy::http(url.as_str())),
                    "https" => Some(reqwest::Proxy::https(url.as_str())),
                    _ => None,
                } {
                    builder = builder.proxy(proxy);
                }
            }
        }
    }

    builder.build()
}

/// Stream the body of a URL to a filesystem path.
///
/// Content is written to a temporary file in the destination directory and
/// renamed into place once complete, so an interrupted download never leaves
/// a file at `dest_path`.
pub fn download_to_path(url: &str, dest_path: &Path, user_agent: &str) -> Result<()> {
    let url = Url::parse(url)?;
    let http_error = |e| PkvenvError::Http(url.to_string(), e);

    let parent = dest_path
        .parent()
        .ok_or_else(|| PkvenvError::CacheDirInvalid(dest_path.to_path_buf()))?;

    warn!("downloading {}", url);
    let client = get_http_client(user_agent).map_err(http_error)?;
    let mut response = client
        .get(url.clone())
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(http_error)?;

    let mut temp_file = tempfile::Builder::new()
        .prefix(".download")
        .tempfile_in(parent)
        .map_err(PkvenvError::io_path(parent))?;

    response
        .copy_to(temp_file.as_file_mut())
        .map_err(http_error)?;

    temp_file
        .persist(dest_path)
        .map_err(|e| PkvenvError::IoPath(dest_path.to_path_buf(), e.error))?;

    warn!("download finished {}", dest_path.display());

    Ok(())
}

/// Ensure remote content is present in a cache directory.
///
/// The presence of a file with the content's filename is the only cache
/// check; existing files are returned without any network access.
pub fn fetch_cached(content: &RemoteContent, cache_dir: &Path, user_agent: &str) -> Result<PathBuf> {
    let cache_path = cache_dir.join(&content.filename);

    if !cache_path.exists() {
        download_to_path(&content.url, &cache_path, user_agent)?;
    }

    Ok(cache_path)
}
