// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*!
Package Python virtualenvs as self-contained Windows applications.

pkvenv reads a project's `pkvenv.json`, inspects the virtualenv it names,
rebuilds that environment on top of an embeddable Python distribution and
writes the result, together with the application's files and a launcher,
to a directory and a zip archive.

This library exposes that functionality to other tools.
*/

pub mod archive;
pub mod cli;
pub mod embedded;
pub mod environment;
pub mod error;
pub mod http;
pub mod logging;
pub mod package_manager;
pub mod payload;
pub mod project;
pub mod project_building;
pub mod project_layout;
pub mod python_distributions;
pub mod requirements;
pub mod venv;
pub mod version;

#[cfg(test)]
mod testutil;
