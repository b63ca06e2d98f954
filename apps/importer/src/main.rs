// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! R2V importer - converts raster-to-vector floor plans into scenes.
//!
//! Each source file is reconstructed into rooms and walls and written out as:
//!
//! - `<id>.scene.json` - scene state with the architecture and RDR edges
//! - `<id>.objectaabb.json` - object annotations as bounding boxes
//! - `<room_id>.arch.json` - one architecture per room (`--room-json`)
//! - `raw_annot.png`, `room_<i>.png` - previews (unless `--no-previews`)
//!
//! Log records go to stderr and are appended to `<output_dir>/log.out`.
//!
//! With more than one source, outputs of each file go to
//! `<output_dir>/<id>/`. Files are converted in parallel; a failing file is
//! logged and does not stop the others.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use rayon::prelude::*;

mod cli;
mod config;
mod error;
mod logging;
mod services;

use cli::{Args, Command};
use config::Config;
use services::{convert_file, ImportSettings};

fn load_settings(args: &Args) -> anyhow::Result<ImportSettings> {
    let paths = &args.config_paths;
    let parser = config::load_parser_config(&paths.parser_config)?;
    let arch = config::load_arch_defaults(&paths.arch_defaults)?;
    // Annotation files carry their labels inline
    let room_types = config::load_room_types(&paths.labels_path, !args.r2v_annot)?;
    Ok(ImportSettings::from_args(args, parser, arch, room_types))
}

fn run(args: Args) -> anyhow::Result<usize> {
    let config = Config::from_env();
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("failed to initialize worker pool")?;

    let settings = load_settings(&args)?;
    let batch = args.sources.len() > 1;

    tracing::info!(
        sources = args.sources.len(),
        output_dir = %args.output_dir.display(),
        worker_threads = config.worker_threads,
        annotation = args.r2v_annot,
        "Starting import"
    );
    let start = Instant::now();

    let failures: Vec<PathBuf> = args
        .sources
        .par_iter()
        .filter_map(|source| {
            let output_dir = if batch {
                args.output_dir.join(services::convert::scene_id(source))
            } else {
                args.output_dir.clone()
            };
            match convert_file(source, &output_dir, &settings) {
                Ok(summary) => {
                    tracing::info!(
                        file = %source.display(),
                        scene = %summary.scene_id,
                        rooms = summary.rooms,
                        walls = summary.walls,
                        rdr = summary.rdr_edges,
                        "Converted"
                    );
                    None
                }
                Err(e) => {
                    tracing::error!(file = %source.display(), error = %e, "Conversion failed");
                    Some(source.clone())
                }
            }
        })
        .collect();

    tracing::info!(
        converted = args.sources.len() - failures.len(),
        failed = failures.len(),
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Import finished"
    );
    Ok(failures.len())
}

fn main() -> ExitCode {
    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print!("{}", cli::USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}\n\n{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init(&args) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Import aborted");
            ExitCode::FAILURE
        }
    }
}
