// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::{
        error::{PkvenvError, Result},
        package_manager::{PackageManager, PackageManagerFactory},
        requirements::{parse_freeze_output, write_requirements_file, Requirement},
    },
    std::{
        cell::RefCell,
        io::Write,
        path::{Path, PathBuf},
        rc::Rc,
    },
};

pub const FAKE_FREEZE_OUTPUT: &str = "pip==20.2.3\nsix==1.15.0\nrequests==2.24.0\n";

/// Create a virtualenv skeleton under `parent` and return its path.
pub fn write_fake_venv(parent: &Path, version: &str) -> Result<PathBuf> {
    let venv_path = parent.join("venv");
    std::fs::create_dir_all(venv_path.join("Scripts"))?;
    std::fs::write(
        venv_path.join("pyvenv.cfg"),
        format!(
            "home = C:\\Python\ninclude-system-site-packages = false\nversion = {}\n",
            version
        ),
    )?;
    std::fs::write(venv_path.join("Scripts").join("python.exe"), b"")?;

    Ok(venv_path)
}

/// Write a zip file resembling a Windows embeddable distribution.
pub fn write_fake_embeddable_zip(path: &Path, major_minor_tag: &str) -> Result<()> {
    let fh = std::fs::File::create(path)?;
    let mut zf = zip::ZipWriter::new(fh);
    let options = zip::write::FileOptions::default();

    let files = [
        ("python.exe".to_string(), b"MZ".to_vec()),
        ("pythonw.exe".to_string(), b"MZ".to_vec()),
        (format!("python{}.dll", major_minor_tag), b"MZ".to_vec()),
        (format!("python{}.zip", major_minor_tag), b"PK".to_vec()),
        (
            format!("python{}._pth", major_minor_tag),
            format!(
                "python{}.zip\n.\n\n# Uncomment to run site.main() automatically\n#import site\n",
                major_minor_tag
            )
            .into_bytes(),
        ),
    ];

    for (name, data) in files {
        zf.start_file(name.clone(), options)
            .map_err(|e| PkvenvError::Zip(path.to_path_buf(), e))?;
        zf.write_all(&data)?;
    }

    zf.finish()
        .map_err(|e| PkvenvError::Zip(path.to_path_buf(), e))?;

    Ok(())
}

/// A package manager that records calls instead of spawning processes.
pub struct FakePackageManager {
    python_exe: PathBuf,
    freeze_output: String,
    calls: Rc<RefCell<Vec<String>>>,
}

impl PackageManager for FakePackageManager {
    fn freeze(&self) -> Result<Vec<Requirement>> {
        self.calls
            .borrow_mut()
            .push(format!("freeze {}", self.python_exe.display()));

        Ok(parse_freeze_output(&self.freeze_output))
    }

    fn bootstrap(&self, script: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("bootstrap {}", script.display()));

        Ok(())
    }

    fn install(&self, requirements: &[Requirement], requirements_path: &Path) -> Result<()> {
        write_requirements_file(requirements, requirements_path)?;
        self.calls
            .borrow_mut()
            .push(format!("install {}", requirements_path.display()));

        Ok(())
    }
}

/// Produces [FakePackageManager] instances sharing one call log.
pub struct FakePackageManagerFactory {
    freeze_output: String,
    calls: Rc<RefCell<Vec<String>>>,
}

impl FakePackageManagerFactory {
    pub fn new(freeze_output: &str) -> Self {
        Self {
            freeze_output: freeze_output.to_string(),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Calls made against any package manager produced by this factory.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl PackageManagerFactory for FakePackageManagerFactory {
    fn package_manager(&self, python_exe: &Path) -> Box<dyn PackageManager> {
        Box::new(FakePackageManager {
            python_exe: python_exe.to_path_buf(),
            freeze_output: self.freeze_output.clone(),
            calls: self.calls.clone(),
        })
    }
}
