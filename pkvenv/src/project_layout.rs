// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generated files of the bundle layout.

use {
    crate::{
        environment::PKVENV_VERSION,
        error::{PkvenvError, Result},
        project::EntryPoint,
    },
    handlebars::Handlebars,
    serde_json::json,
};

/// Name of the package the launcher runs with `python -m`.
pub const MAIN_PACKAGE_NAME: &str = "pkvenv_main";

fn template_error(e: impl std::fmt::Display) -> PkvenvError {
    PkvenvError::Template(e.to_string())
}

fn handlebars() -> Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string(
            "pkvenv_main.py",
            include_str!("templates/pkvenv_main.py.hbs"),
        )
        .map_err(template_error)?;
    handlebars
        .register_template_string("launcher.bat", include_str!("templates/launcher.bat.hbs"))
        .map_err(template_error)?;
    handlebars
        .register_template_string("launcher.sh", include_str!("templates/launcher.sh.hbs"))
        .map_err(template_error)?;

    Ok(handlebars)
}

/// Render the `__main__.py` of the main package.
pub fn render_main_py(entry_point: &EntryPoint) -> Result<String> {
    let data = json!({
        "pkvenv_version": PKVENV_VERSION,
        "module": entry_point.module,
        "function": entry_point.function,
    });

    handlebars()?
        .render("pkvenv_main.py", &data)
        .map_err(template_error)
}

/// Render a Windows batch file launcher.
///
/// `python_exe` is the interpreter path relative to the launcher's directory.
pub fn render_launcher_bat(python_exe: &str, gui: bool) -> Result<String> {
    let data = json!({
        "python_exe": python_exe.replace('/', "\\"),
        "gui": gui,
    });

    let script = handlebars()?
        .render("launcher.bat", &data)
        .map_err(template_error)?;

    Ok(script
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("{}\r\n", line))
        .collect())
}

/// Render a POSIX shell launcher.
pub fn render_launcher_sh(python_exe: &str) -> Result<String> {
    let data = json!({
        "python_exe": python_exe.replace('\\', "/"),
    });

    handlebars()?
        .render("launcher.sh", &data)
        .map_err(template_error)
}
