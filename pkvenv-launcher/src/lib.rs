// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*!
Launcher for applications packaged by pkvenv.

A copy of the launcher lives at the root of an application tree, next to
the `Python` directory holding the embedded interpreter. It runs the
`pkvenv_main` package with that interpreter and exits with its status.
*/

use {
    duct::cmd,
    std::{
        ffi::OsString,
        path::{Path, PathBuf},
    },
};

/// Directory holding the embedded interpreter, relative to the launcher.
pub const PYTHON_DIR: &str = "Python";

/// Package run with `python -m`.
pub const MAIN_PACKAGE: &str = "pkvenv_main";

/// Path of the interpreter to run for a launcher in `launcher_dir`.
pub fn python_exe(launcher_dir: &Path, gui: bool) -> PathBuf {
    launcher_dir
        .join(PYTHON_DIR)
        .join(if gui { "pythonw.exe" } else { "python.exe" })
}

/// Run the application next to `launcher_dir`, returning its exit code.
pub fn launch(
    launcher_dir: &Path,
    gui: bool,
    args: impl IntoIterator<Item = OsString>,
) -> std::io::Result<i32> {
    let mut argv = vec![OsString::from("-m"), OsString::from(MAIN_PACKAGE)];
    argv.extend(args);

    let output = cmd(python_exe(launcher_dir, gui), argv).unchecked().run()?;

    Ok(output.status.code().unwrap_or(1))
}

/// Run the application next to the current executable with this process's arguments.
pub fn run(gui: bool) -> i32 {
    let launcher_dir = match std::env::current_exe() {
        Ok(exe) => match exe.parent() {
            Some(dir) => dir.to_path_buf(),
            None => {
                println!("error: can not resolve directory of {}", exe.display());
                return 1;
            }
        },
        Err(e) => {
            println!("error: can not resolve current executable: {}", e);
            return 1;
        }
    };

    match launch(&launcher_dir, gui, std::env::args_os().skip(1)) {
        Ok(code) => code,
        Err(e) => {
            println!(
                "error: running {}: {}",
                python_exe(&launcher_dir, gui).display(),
                e
            );
            1
        }
    }
}
