// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*!
Functionality for Windows embeddable distributions.

The official Python project distributes zip files containing a python.exe,
pythonXY.dll, a pythonXY.zip holding the standard library and a
`pythonXY._pth` file defining the module search path. These distributions
don't contain pip, so it is bootstrapped with `get-pip.py`.
*/

use {
    crate::{
        environment::Settings,
        error::{PkvenvError, Result},
        package_manager::PackageManagerFactory,
        python_distributions::fetch_get_pip,
        requirements::Requirement,
        venv::find_python_exe,
    },
    log::warn,
    std::{
        io::{Read, Write},
        path::{Path, PathBuf},
    },
};

/// Directory under the output root the distribution is extracted to.
pub const EMBEDDED_PYTHON_DIR: &str = "Python";

/// Lines appended to the `._pth` file.
///
/// `..` puts the output root on `sys.path`, which is where application files
/// are placed. `import site` enables `site-packages`, which pip installs into.
const PTH_ADDITIONS: &[&str] = &["..", "import site"];

/// Extract a zip archive to a directory.
///
/// Members whose names would escape `dest_dir` are rejected.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let zip_error = |e| PkvenvError::Zip(archive_path.to_path_buf(), e);

    let fh = std::fs::File::open(archive_path).map_err(PkvenvError::io_path(archive_path))?;
    let mut zf = zip::ZipArchive::new(std::io::BufReader::new(fh)).map_err(zip_error)?;

    for i in 0..zf.len() {
        let mut f = zf.by_index(i).map_err(zip_error)?;

        let relative_path = f
            .enclosed_name()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| PkvenvError::UnsafeArchivePath(f.name().to_string()))?;
        let dest_path = dest_dir.join(relative_path);

        if f.is_dir() {
            std::fs::create_dir_all(&dest_path).map_err(PkvenvError::io_path(&dest_path))?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent).map_err(PkvenvError::io_path(parent))?;
        }

        let mut data = Vec::new();
        f.read_to_end(&mut data)
            .map_err(PkvenvError::io_path(&dest_path))?;
        std::fs::write(&dest_path, data).map_err(PkvenvError::io_path(&dest_path))?;
    }

    Ok(())
}

/// Find the `pythonXY._pth` file in an extracted distribution.
pub fn find_pth_file(dir: &Path) -> Result<PathBuf> {
    for entry in std::fs::read_dir(dir).map_err(PkvenvError::io_path(dir))? {
        let entry = entry.map_err(PkvenvError::io_path(dir))?;
        let name = entry.file_name().to_string_lossy().to_string();

        if name.starts_with("python") && name.ends_with("._pth") && entry.path().is_file() {
            return Ok(entry.path());
        }
    }

    Err(PkvenvError::PthFileMissing(dir.to_path_buf()))
}

/// Append the module search path entries pkvenv relies on to a `._pth` file.
pub fn patch_pth_file(path: &Path) -> Result<()> {
    let existing = std::fs::read_to_string(path).map_err(PkvenvError::io_path(path))?;

    let mut fh = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(PkvenvError::io_path(path))?;

    let mut content = String::new();
    if !existing.is_empty() && !existing.ends_with('\n') {
        content.push('\n');
    }
    for line in PTH_ADDITIONS {
        content.push_str(line);
        content.push('\n');
    }

    fh.write_all(content.as_bytes())
        .map_err(PkvenvError::io_path(path))?;

    Ok(())
}

/// An embeddable distribution extracted into an output tree.
#[derive(Clone, Debug)]
pub struct EmbeddedPython {
    /// Directory the distribution was extracted to.
    pub dir: PathBuf,

    /// Path to the distribution's python executable.
    pub python_exe: PathBuf,

    /// Path to the patched `._pth` file.
    pub pth_path: PathBuf,
}

impl EmbeddedPython {
    /// Extract an embeddable distribution zip into `<output_path>/Python`.
    pub fn extract(archive_path: &Path, output_path: &Path) -> Result<Self> {
        let dir = output_path.join(EMBEDDED_PYTHON_DIR);

        warn!("extracting {} to {}", archive_path.display(), dir.display());
        extract_zip(archive_path, &dir)?;

        let pth_path = find_pth_file(&dir)?;
        patch_pth_file(&pth_path)?;

        let python_exe = find_python_exe(&dir, &["python.exe", "python3", "python"])
            .ok_or_else(|| PkvenvError::PythonNotFound(dir.clone()))?;

        Ok(Self {
            dir,
            python_exe,
            pth_path,
        })
    }

    /// Bootstrap pip and install requirements into the distribution.
    pub fn install_requirements(
        &self,
        settings: &Settings,
        factory: &dyn PackageManagerFactory,
        requirements: &[Requirement],
    ) -> Result<()> {
        let get_pip = fetch_get_pip(settings)?;
        let package_manager = factory.package_manager(&self.python_exe);

        warn!("installing pip into {}", self.dir.display());
        package_manager.bootstrap(&get_pip)?;

        if requirements.is_empty() {
            warn!("no requirements to install");
            return Ok(());
        }

        package_manager.install(requirements, &self.dir.join("requirements.txt"))
    }
}

/// Build the embedded Python environment of an output tree.
pub fn setup_python(
    settings: &Settings,
    factory: &dyn PackageManagerFactory,
    archive_path: &Path,
    requirements: &[Requirement],
    output_path: &Path,
) -> Result<EmbeddedPython> {
    let python = EmbeddedPython::extract(archive_path, output_path)?;
    python.install_requirements(settings, factory, requirements)?;

    Ok(python)
}
