// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*!
Interaction with Python packaging tools (pip).

Packaging tools are only ever driven as external processes. The
[PackageManager] trait is the seam between the build pipeline and those
processes.
*/

use {
    crate::{
        error::{PkvenvError, Result},
        requirements::{parse_freeze_output, write_requirements_file, Requirement},
    },
    duct::cmd,
    log::{info, warn},
    std::path::{Path, PathBuf},
};

/// A package manager bound to a Python interpreter.
pub trait PackageManager {
    /// Obtain the requirements installed in the interpreter's environment.
    fn freeze(&self) -> Result<Vec<Requirement>>;

    /// Install the package manager itself by running a bootstrap script.
    fn bootstrap(&self, script: &Path) -> Result<()>;

    /// Install requirements into the interpreter's environment.
    ///
    /// `requirements_path` is where the requirements file handed to the
    /// package manager is written.
    fn install(&self, requirements: &[Requirement], requirements_path: &Path) -> Result<()>;
}

/// Constructs [PackageManager] instances for Python executables.
pub trait PackageManagerFactory {
    fn package_manager(&self, python_exe: &Path) -> Box<dyn PackageManager>;
}

/// Drives `pip` via `python -m pip`.
#[derive(Clone, Debug)]
pub struct Pip {
    python_exe: PathBuf,
}

impl Pip {
    pub fn new(python_exe: impl Into<PathBuf>) -> Self {
        Self {
            python_exe: python_exe.into(),
        }
    }

    /// Directory processes are run from: the interpreter's own directory.
    fn working_dir(&self) -> &Path {
        self.python_exe.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Run the interpreter with arguments and return its standard output.
    ///
    /// stderr is captured separately. It is logged on success and included
    /// in the error on failure.
    fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("{} {}", self.python_exe.display(), args.join(" "));
        info!("running {}", command);

        let output = cmd(&self.python_exe, args)
            .dir(self.working_dir())
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .map_err(PkvenvError::io_path(&self.python_exe))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(PkvenvError::Subprocess {
                command,
                status: output.status.to_string(),
                output: format!("{}{}", stdout, stderr),
            });
        }

        for line in stderr.lines() {
            info!("{}", line);
        }

        Ok(stdout)
    }
}

impl PackageManager for Pip {
    fn freeze(&self) -> Result<Vec<Requirement>> {
        let output = self.run(&["-m", "pip", "freeze"])?;

        Ok(parse_freeze_output(&output))
    }

    fn bootstrap(&self, script: &Path) -> Result<()> {
        let script = script.display().to_string();
        let output = self.run(&[&script])?;

        for line in output.lines() {
            info!("{}", line);
        }

        Ok(())
    }

    fn install(&self, requirements: &[Requirement], requirements_path: &Path) -> Result<()> {
        write_requirements_file(requirements, requirements_path)?;

        warn!(
            "installing {} requirements from {}",
            requirements.len(),
            requirements_path.display()
        );

        let path = requirements_path.display().to_string();
        let output = self.run(&[
            "-m",
            "pip",
            "--disable-pip-version-check",
            "install",
            "-r",
            &path,
        ])?;

        for line in output.lines() {
            info!("{}", line);
        }

        Ok(())
    }
}

/// Produces [Pip] instances.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipFactory;

impl PackageManagerFactory for PipFactory {
    fn package_manager(&self, python_exe: &Path) -> Box<dyn PackageManager> {
        Box::new(Pip::new(python_exe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_interpreter() -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let pip = PipFactory.package_manager(&temp_dir.path().join("no-such-python"));

        assert!(pip.freeze().is_err());

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn failure_carries_output() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let python = temp_dir.path().join("python");
        std::fs::write(&python, "#!/bin/sh\necho \"no module named pip\" >&2\nexit 3\n")?;
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755))?;

        match Pip::new(&python).freeze() {
            Err(PkvenvError::Subprocess { output, .. }) => {
                assert!(output.contains("no module named pip"));
            }
            res => panic!("unexpected result: {:?}", res),
        }

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn freeze_parses_output() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let python = temp_dir.path().join("python");
        std::fs::write(&python, "#!/bin/sh\nprintf 'pip==20.0\\nsix==1.15.0\\n'\n")?;
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755))?;

        assert_eq!(
            Pip::new(&python).freeze()?,
            vec![Requirement::Pinned {
                name: "six".to_string(),
                version: "1.15.0".to_string()
            }]
        );

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn freeze_ignores_stderr() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let python = temp_dir.path().join("python");
        std::fs::write(
            &python,
            concat!(
                "#!/bin/sh\n",
                "echo \"WARNING: Could not generate requirement for distribution -ip 20.0: ",
                "Parse error at '-ip==20.': Expected W\" >&2\n",
                "echo 'six==1.15.0'\n",
            ),
        )?;
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755))?;

        assert_eq!(
            Pip::new(&python).freeze()?,
            vec![Requirement::Pinned {
                name: "six".to_string(),
                version: "1.15.0".to_string()
            }]
        );

        Ok(())
    }
}
