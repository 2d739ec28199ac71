// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*!
Building pkvenv projects.

A build turns a project directory into `build/pkvenv/`, a self-contained
application tree, and `build/<name>.zip`, an archive of that tree.
*/

use {
    crate::{
        archive::archive_directory,
        embedded::setup_python,
        environment::Settings,
        error::{PkvenvError, Result},
        package_manager::PackageManagerFactory,
        payload::{assemble_payload, Launcher},
        project::ProjectDescriptor,
        python_distributions::fetch_embeddable_python,
        venv::VirtualEnvironment,
    },
    log::{info, warn},
    std::path::{Path, PathBuf},
};

/// Remove and recreate a directory.
fn reset_dir(path: &Path) -> Result<()> {
    if path.exists() {
        info!("removing {}", path.display());
        std::fs::remove_dir_all(path).map_err(PkvenvError::io_path(path))?;
    }

    std::fs::create_dir_all(path).map_err(PkvenvError::io_path(path))?;

    Ok(())
}

/// Build the project in `project_dir`.
///
/// Returns the path of the written archive.
pub fn build_project(
    settings: &Settings,
    factory: &dyn PackageManagerFactory,
    project_dir: &Path,
) -> Result<PathBuf> {
    let project = ProjectDescriptor::from_project_dir(project_dir)?;
    warn!("building {} in {}", project.name, project.project_dir.display());

    let output_path = project.output_path();
    reset_dir(&output_path)?;

    let venv = VirtualEnvironment::from_path(&project.venv_path)?;
    warn!("virtualenv uses Python {}", venv.version);
    let requirements = venv.requirements(factory)?;

    let archive = fetch_embeddable_python(settings, &venv.version)?;
    let python = setup_python(settings, factory, &archive, &requirements, &output_path)?;

    let launcher = Launcher::resolve(settings.launcher_dir.as_deref(), project.gui);
    assemble_payload(&project, &python, &launcher, &output_path)?;

    let archive_path = project.archive_path();
    archive_directory(&output_path, &archive_path)?;

    warn!("wrote {}", archive_path.display());

    Ok(archive_path)
}
