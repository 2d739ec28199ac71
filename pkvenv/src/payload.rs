// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*!
Assembly of application files and launchers in the output tree.

Application files are placed directly in the output root. The embedded
distribution's `._pth` file lists `..`, so the output root is on `sys.path`.
*/

use {
    crate::{
        embedded::{EmbeddedPython, EMBEDDED_PYTHON_DIR},
        error::{PkvenvError, Result},
        project::{IncludePath, ProjectDescriptor},
        project_layout::{
            render_launcher_bat, render_launcher_sh, render_main_py, MAIN_PACKAGE_NAME,
        },
    },
    log::{info, warn},
    std::path::{Path, PathBuf},
    walkdir::WalkDir,
};

/// Base name of the console launcher stub.
pub const LAUNCHER_STUB: &str = "pkvenv-launcher";

/// Base name of the GUI launcher stub.
pub const GUI_LAUNCHER_STUB: &str = "pkvenv-launcher-gui";

/// Recursively copy a directory to `dest_dir`.
///
/// Symlinks are followed and the content they point to is copied.
pub fn copy_dir(source_dir: &Path, dest_dir: &Path) -> Result<()> {
    for entry in WalkDir::new(source_dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source_dir).to_path_buf();
            PkvenvError::IoPath(path, e.into())
        })?;

        let rel_path = match entry.path().strip_prefix(source_dir) {
            Ok(p) => p,
            Err(_) => continue,
        };
        let dest_path = dest_dir.join(rel_path);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest_path).map_err(PkvenvError::io_path(&dest_path))?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &dest_path).map_err(PkvenvError::io_path(&dest_path))?;
        } else {
            warn!("{} is not a file or dir; skipping", entry.path().display());
        }
    }

    Ok(())
}

/// Copy included paths into the package area.
///
/// Returns the paths written. Unsupported paths are skipped with a warning.
/// Includes named like the generated interpreter directory or main package
/// are rejected.
pub fn copy_files(include: &[IncludePath], package_path: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(package_path).map_err(PkvenvError::io_path(package_path))?;

    let mut res = Vec::new();

    for item in include {
        match item {
            IncludePath::File(path) | IncludePath::Directory(path) => {
                let file_name = match path.file_name() {
                    Some(name) => name,
                    None => {
                        warn!("{} has no file name; skipping", path.display());
                        continue;
                    }
                };
                if file_name == EMBEDDED_PYTHON_DIR || file_name == MAIN_PACKAGE_NAME {
                    return Err(PkvenvError::ReservedIncludeName(path.clone()));
                }

                let dest_path = package_path.join(file_name);

                info!("copying {} to {}", path.display(), dest_path.display());

                if matches!(item, IncludePath::File(_)) {
                    std::fs::copy(path, &dest_path).map_err(PkvenvError::io_path(path))?;
                } else {
                    copy_dir(path, &dest_path)?;
                }

                res.push(dest_path);
            }
            IncludePath::Unsupported(path) => {
                warn!("{} is not a file or dir; skipping", path.display());
            }
        }
    }

    Ok(res)
}

/// Write the package the launcher runs: `pkvenv_main/__main__.py`.
pub fn write_main_package(project: &ProjectDescriptor, output_path: &Path) -> Result<PathBuf> {
    let package_dir = output_path.join(MAIN_PACKAGE_NAME);
    std::fs::create_dir_all(&package_dir).map_err(PkvenvError::io_path(&package_dir))?;

    let init_path = package_dir.join("__init__.py");
    std::fs::write(&init_path, b"").map_err(PkvenvError::io_path(&init_path))?;

    let main_path = package_dir.join("__main__.py");
    std::fs::write(&main_path, render_main_py(&project.entry_point)?)
        .map_err(PkvenvError::io_path(&main_path))?;

    Ok(package_dir)
}

/// How the bundle is launched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Launcher {
    /// A precompiled launcher executable copied from this path.
    Executable(PathBuf),

    /// A generated script running the embedded interpreter.
    Script,
}

impl Launcher {
    /// Find the launcher stub for a variant in a directory of stubs.
    ///
    /// Falls back to a script launcher if no stub is available.
    pub fn resolve(launcher_dir: Option<&Path>, gui: bool) -> Self {
        let stub_name = format!(
            "{}{}",
            if gui { GUI_LAUNCHER_STUB } else { LAUNCHER_STUB },
            std::env::consts::EXE_SUFFIX
        );

        match launcher_dir.map(|dir| dir.join(&stub_name)) {
            Some(path) if path.is_file() => Self::Executable(path),
            _ => {
                warn!(
                    "launcher stub {} not found; writing a launcher script instead",
                    stub_name
                );
                Self::Script
            }
        }
    }
}

/// Interpreter the launcher runs, relative to the output root.
fn launcher_python_exe(python: &EmbeddedPython, gui: bool) -> String {
    let windowed = python.dir.join("pythonw.exe");

    let exe = if gui && windowed.is_file() {
        windowed
    } else {
        python.python_exe.clone()
    };

    let file_name = exe
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "python.exe".to_string());

    format!("{}/{}", EMBEDDED_PYTHON_DIR, file_name)
}

/// Write the launcher to the output root.
///
/// Returns the path of the launcher.
pub fn write_launcher(
    project: &ProjectDescriptor,
    python: &EmbeddedPython,
    launcher: &Launcher,
    output_path: &Path,
) -> Result<PathBuf> {
    match launcher {
        Launcher::Executable(stub) => {
            let dest_path =
                output_path.join(format!("{}{}", project.name, std::env::consts::EXE_SUFFIX));
            warn!("writing launcher {}", dest_path.display());
            std::fs::copy(stub, &dest_path).map_err(PkvenvError::io_path(stub))?;

            Ok(dest_path)
        }
        Launcher::Script => {
            let python_exe = launcher_python_exe(python, project.gui);

            let (dest_path, script) = if cfg!(windows) {
                (
                    output_path.join(format!("{}.bat", project.name)),
                    render_launcher_bat(&python_exe, project.gui)?,
                )
            } else {
                (
                    output_path.join(format!("{}.sh", project.name)),
                    render_launcher_sh(&python_exe)?,
                )
            };

            warn!("writing launcher {}", dest_path.display());
            std::fs::write(&dest_path, script).map_err(PkvenvError::io_path(&dest_path))?;
            set_executable(&dest_path)?;

            Ok(dest_path)
        }
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)
        .map_err(PkvenvError::io_path(path))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    std::fs::set_permissions(path, permissions).map_err(PkvenvError::io_path(path))?;

    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Copy application files and write the launcher.
///
/// Returns the path of the launcher.
pub fn assemble_payload(
    project: &ProjectDescriptor,
    python: &EmbeddedPython,
    launcher: &Launcher,
    output_path: &Path,
) -> Result<PathBuf> {
    copy_files(&project.include, output_path)?;
    write_main_package(project, output_path)?;

    write_launcher(project, python, launcher, output_path)
}

#[cfg(test)]
mod tests {
    use {super::*, crate::project::EntryPoint};

    fn project(root: &Path, gui: bool) -> Result<ProjectDescriptor> {
        Ok(ProjectDescriptor {
            project_dir: root.to_path_buf(),
            name: "demo".to_string(),
            entry_point: "app:main".parse::<EntryPoint>()?,
            venv_path: root.join("venv"),
            include: vec![],
            gui,
        })
    }

    fn embedded_python(output_path: &Path) -> Result<EmbeddedPython> {
        let dir = output_path.join(EMBEDDED_PYTHON_DIR);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("python.exe"), b"")?;
        std::fs::write(dir.join("pythonw.exe"), b"")?;

        Ok(EmbeddedPython {
            python_exe: dir.join("python.exe"),
            pth_path: dir.join("python38._pth"),
            dir,
        })
    }

    #[test]
    fn copy_includes() -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let root = temp_dir.path();

        std::fs::write(root.join("app.py"), "def main(): pass\n")?;
        std::fs::create_dir_all(root.join("pkg").join("sub"))?;
        std::fs::write(root.join("pkg").join("__init__.py"), "")?;
        std::fs::write(root.join("pkg").join("sub").join("data.txt"), "data")?;

        let include = vec![
            IncludePath::classify(root.join("app.py")),
            IncludePath::classify(root.join("pkg")),
            IncludePath::classify(root.join("missing.py")),
        ];

        let out = root.join("out");
        let copied = copy_files(&include, &out)?;

        assert_eq!(copied, vec![out.join("app.py"), out.join("pkg")]);
        assert!(out.join("app.py").is_file());
        assert!(out.join("pkg").join("__init__.py").is_file());
        assert_eq!(
            std::fs::read_to_string(out.join("pkg").join("sub").join("data.txt"))?,
            "data"
        );
        assert!(!out.join("missing.py").exists());

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn copy_follows_symlinks() -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let root = temp_dir.path();

        std::fs::write(root.join("real.py"), "VALUE = 1\n")?;
        std::fs::create_dir_all(root.join("shared"))?;
        std::fs::write(root.join("shared").join("util.py"), "")?;
        std::fs::create_dir_all(root.join("pkg"))?;
        std::fs::write(root.join("pkg").join("__init__.py"), "")?;
        std::os::unix::fs::symlink("../real.py", root.join("pkg").join("linked.py"))?;
        std::os::unix::fs::symlink("../shared", root.join("pkg").join("shared"))?;

        let out = root.join("out");
        copy_files(&[IncludePath::classify(root.join("pkg"))], &out)?;

        let linked = out.join("pkg").join("linked.py");
        assert!(linked.is_file());
        assert!(!std::fs::symlink_metadata(&linked)?.file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&linked)?, "VALUE = 1\n");
        assert!(out.join("pkg").join("shared").join("util.py").is_file());

        Ok(())
    }

    #[test]
    fn reserved_include_names() -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let root = temp_dir.path();

        for name in [EMBEDDED_PYTHON_DIR, MAIN_PACKAGE_NAME] {
            std::fs::create_dir_all(root.join("src").join(name))?;

            assert!(matches!(
                copy_files(
                    &[IncludePath::classify(root.join("src").join(name))],
                    &root.join("out")
                ),
                Err(PkvenvError::ReservedIncludeName(_))
            ));
        }
        assert!(!root.join("out").join(EMBEDDED_PYTHON_DIR).exists());

        Ok(())
    }

    #[test]
    fn main_package() -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let project = project(temp_dir.path(), false)?;

        let package_dir = write_main_package(&project, &temp_dir.path().join("out"))?;

        assert!(package_dir.join("__init__.py").is_file());
        let main_py = std::fs::read_to_string(package_dir.join("__main__.py"))?;
        assert!(main_py.contains("from app import main\n"));

        Ok(())
    }

    #[test]
    fn resolve_stub() -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let stub = temp_dir.path().join(format!(
            "{}{}",
            GUI_LAUNCHER_STUB,
            std::env::consts::EXE_SUFFIX
        ));
        std::fs::write(&stub, b"stub")?;

        assert_eq!(
            Launcher::resolve(Some(temp_dir.path()), true),
            Launcher::Executable(stub)
        );
        assert_eq!(Launcher::resolve(Some(temp_dir.path()), false), Launcher::Script);
        assert_eq!(Launcher::resolve(None, true), Launcher::Script);

        Ok(())
    }

    #[test]
    fn executable_launcher() -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let out = temp_dir.path().join("out");
        let python = embedded_python(&out)?;
        let stub = temp_dir.path().join("stub");
        std::fs::write(&stub, b"stub")?;

        let path = write_launcher(
            &project(temp_dir.path(), false)?,
            &python,
            &Launcher::Executable(stub),
            &out,
        )?;

        assert_eq!(
            path,
            out.join(format!("demo{}", std::env::consts::EXE_SUFFIX))
        );
        assert_eq!(std::fs::read(&path)?, b"stub");

        Ok(())
    }

    #[test]
    fn script_launcher() -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("pkvenv-test").tempdir()?;
        let out = temp_dir.path().join("out");
        let python = embedded_python(&out)?;

        let path = write_launcher(
            &project(temp_dir.path(), true)?,
            &python,
            &Launcher::Script,
            &out,
        )?;
        let script = std::fs::read_to_string(&path)?;

        if cfg!(windows) {
            assert_eq!(path, out.join("demo.bat"));
            assert!(script.contains("Python\\pythonw.exe"));
        } else {
            assert_eq!(path, out.join("demo.sh"));
            assert!(script.contains("Python/pythonw.exe"));
        }

        Ok(())
    }
}
