// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zip archives of output trees.

use {
    crate::error::{PkvenvError, Result},
    log::warn,
    std::{
        io::{BufWriter, Write},
        path::Path,
    },
    walkdir::WalkDir,
};

#[cfg(unix)]
fn unix_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    if metadata.permissions().mode() & 0o111 != 0 {
        0o755
    } else {
        0o644
    }
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}

/// Write a zip archive of everything under `source_dir` to `dest_path`.
///
/// Member names are relative to `source_dir` and use `/` separators. An
/// existing archive at `dest_path` is replaced.
pub fn archive_directory(source_dir: &Path, dest_path: &Path) -> Result<()> {
    let zip_error = |e| PkvenvError::Zip(dest_path.to_path_buf(), e);

    warn!(
        "archiving {} to {}",
        source_dir.display(),
        dest_path.display()
    );

    if let Some(parent) = dest_path.parent() {
        std::fs::create_dir_all(parent).map_err(PkvenvError::io_path(parent))?;
    }

    let fh = std::fs::File::create(dest_path).map_err(PkvenvError::io_path(dest_path))?;
    let mut zf = zip::ZipWriter::new(BufWriter::new(fh));

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source_dir).to_path_buf();
            PkvenvError::IoPath(path, e.into())
        })?;

        let rel_path = match entry.path().strip_prefix(source_dir) {
            Ok(p) if !p.as_os_str().is_empty() => p,
            _ => continue,
        };
        let name = rel_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let metadata = entry
            .metadata()
            .map_err(|e| PkvenvError::IoPath(entry.path().to_path_buf(), e.into()))?;

        if metadata.is_dir() {
            zf.add_directory(name, zip::write::FileOptions::default())
                .map_err(zip_error)?;
        } else if metadata.is_file() {
            let options = zip::write::FileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated)
                .unix_permissions(unix_mode(&metadata));

            zf.start_file(name, options).map_err(zip_error)?;
            let data = std::fs::read(entry.path()).map_err(PkvenvError::io_path(entry.path()))?;
            zf.write_all(&data)
                .map_err(PkvenvError::io_path(entry.path()))?;
        }
    }

    let mut writer = zf.finish().map_err(zip_error)?;
    writer.flush().map_err(PkvenvError::io_path(dest_path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Read};

    #[test]
    fn archive_tree() -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let source = temp_dir.path().join("tree");
        std::fs::create_dir_all(source.join("Python"))?;
        std::fs::write(source.join("app.py"), "print('hi')\n")?;
        std::fs::write(source.join("Python").join("python.exe"), b"exe")?;

        let dest = temp_dir.path().join("demo.zip");
        std::fs::write(&dest, b"stale")?;
        archive_directory(&source, &dest)?;

        let mut zf = zip::ZipArchive::new(std::fs::File::open(&dest)?)
            .map_err(|e| PkvenvError::Zip(dest.clone(), e))?;
        let mut names = zf.file_names().map(|s| s.to_string()).collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["Python/", "Python/python.exe", "app.py"]);

        let mut content = String::new();
        zf.by_name("app.py")
            .map_err(|e| PkvenvError::Zip(dest.clone(), e))?
            .read_to_string(&mut content)?;
        assert_eq!(content, "print('hi')\n");

        Ok(())
    }
}
