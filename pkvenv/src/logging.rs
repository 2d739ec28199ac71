// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use log::LevelFilter;

/// Install the global logger.
///
/// `RUST_LOG` overrides `log_level`.
pub fn init_logger(log_level: LevelFilter) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    // HTTP stack internals are noise at the levels pkvenv logs at.
    if log_level == LevelFilter::Info {
        builder
            .filter_module("rustls", LevelFilter::Error)
            .filter_module("reqwest", LevelFilter::Warn);
    }

    // A logger may already be installed when embedded in another tool.
    let _ = builder.try_init();
}
