//! Store host entry point.
//!
//! # Responsibility
//! - Resolve the data directory, start the store, report per-kind record
//!   counts, and stop the store so every kind is persisted.
//! - Exit non-zero on fatal startup failure or any failed persist.

use log::error;
use std::process::ExitCode;
use yumyum_core::{
    init_logging_from, resolve_data_directory, seed_source_for, DataStore, StoreConfig,
};

fn main() -> ExitCode {
    let config = StoreConfig::from_env();
    if let Err(err) = init_logging_from(&config) {
        eprintln!("yumyum: logging disabled: {err}");
    }

    let seed = seed_source_for(&config);
    let data_dir = match resolve_data_directory(&config, seed.as_ref()) {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("yumyum: {err}");
            return ExitCode::FAILURE;
        }
    };

    let store = DataStore::new();
    if let Err(err) = store.start(&data_dir) {
        eprintln!("yumyum: {err}");
        return ExitCode::FAILURE;
    }

    println!("yumyum_core version={}", yumyum_core::core_version());
    println!("data_dir={}", data_dir.display());
    match store.counts() {
        Ok(counts) => {
            for (kind, count) in counts {
                println!("{}={}", kind.file_stem(), count);
            }
        }
        Err(err) => error!("event=cli_summary module=cli status=error error={err}"),
    }

    match store.stop() {
        Ok(report) if report.is_clean() => ExitCode::SUCCESS,
        Ok(report) => {
            for failure in &report.failures {
                eprintln!("yumyum: {failure}");
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("yumyum: {err}");
            ExitCode::FAILURE
        }
    }
}
