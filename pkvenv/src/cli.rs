// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::{
        environment::{Settings, CACHE_DIR_ENV, LAUNCHER_DIR_ENV, PKVENV_VERSION},
        error::Result,
        logging,
        package_manager::PipFactory,
        project::CONFIG_FILE_NAME,
        project_building::build_project,
    },
    clap::{value_parser, Arg, ArgAction, Command},
    log::LevelFilter,
    std::path::PathBuf,
};

const PKVENV_ABOUT: &str = "\
Package a Python virtualenv as a self-contained Windows application.

The PROJECT_DIR argument is a filesystem path to a directory containing a
pkvenv.json file. That file names the application, its entry point, the
virtualenv to rebuild and the files to include.

The packages installed in the virtualenv are reinstalled into an embeddable
Python distribution matching the virtualenv's Python version. The result is
written to build/pkvenv/ and archived to build/<name>.zip in the project
directory.
";

fn command() -> Command {
    Command::new("pkvenv")
        .version(PKVENV_VERSION)
        .about("Package Python virtualenvs as self-contained applications")
        .long_about(PKVENV_ABOUT)
        .after_help(format!(
            "Downloads are cached in ~/.pkvenv unless {} is set. Launcher stubs are \
             read from the directory of this executable unless {} is set.",
            CACHE_DIR_ENV, LAUNCHER_DIR_ENV
        ))
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose output"),
        )
        .arg(
            Arg::new("project_dir")
                .required(true)
                .value_name("PROJECT_DIR")
                .value_parser(value_parser!(PathBuf))
                .help(format!("Directory containing a {} file", CONFIG_FILE_NAME)),
        )
}

pub fn run_cli() -> Result<()> {
    let matches = command().get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    logging::init_logger(log_level);

    let project_dir = matches
        .get_one::<PathBuf>("project_dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let settings = Settings::from_env()?;
    build_project(&settings, &PipFactory, &project_dir)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition() {
        command().debug_assert();
    }

    #[test]
    fn parse_args() {
        let matches = command().get_matches_from(["pkvenv", "--verbose", "project"]);

        assert!(matches.get_flag("verbose"));
        assert_eq!(
            matches.get_one::<PathBuf>("project_dir"),
            Some(&PathBuf::from("project"))
        );
    }
}
