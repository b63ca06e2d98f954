// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line arguments.

use std::path::PathBuf;

use crate::config::ConfigPaths;
use crate::error::{ImporterError, Result};

pub const USAGE: &str = "\
Usage: r2v-importer <output_dir> <source>... [options]

Converts raster-to-vector output (or annotation) files to scene.json.

Options:
  --r2v-annot                           Sources are R2V annotation files
  --scale-factor <f>                    Multiply all XY coordinates (default: 1.0)
  --no-previews                         Do not write PNG previews
  --room-json                           Write an arch.json per room
  --skip-objects                        Do not collect object annotations
  --do-not-adjust-short-walls           Keep all walls at full height
  --do-not-classify-doors-and-windows   Leave holes unclassified
  --skip-rdr                            Do not compute room-door-room edges
  --parser-config <path>                parser_config.json
  --arch-defaults <path>                arch_defaults.json
  --labels-path <dir>                   Directory containing room_types.json
  -l, --log-level <level>               DEBUG, INFO, WARNING, ERROR or CRITICAL (default: INFO)
  --log-json                            Emit JSON log lines
  -h, --help                            Show this help
";

/// Parsed importer arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub output_dir: PathBuf,
    pub sources: Vec<PathBuf>,
    pub r2v_annot: bool,
    pub scale_factor: f64,
    pub previews: bool,
    pub room_json: bool,
    pub skip_objects: bool,
    pub adjust_short_walls: bool,
    pub classify_doors_and_windows: bool,
    pub skip_rdr: bool,
    pub config_paths: ConfigPaths,
    /// `tracing` filter directive derived from `--log-level`.
    pub log_level: String,
    pub log_json: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Args),
    Help,
}

fn log_directive(level: &str) -> Result<String> {
    let directive = match level.to_ascii_uppercase().as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" | "WARN" => "warn",
        "ERROR" | "CRITICAL" => "error",
        "TRACE" => "trace",
        _ => return Err(ImporterError::Usage(format!("invalid log level '{level}'"))),
    };
    Ok(directive.to_string())
}

/// Parse arguments, excluding the program name.
pub fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut positional: Vec<String> = Vec::new();
    let mut r2v_annot = false;
    let mut scale_factor = 1.0;
    let mut previews = true;
    let mut room_json = false;
    let mut skip_objects = false;
    let mut adjust_short_walls = true;
    let mut classify = true;
    let mut skip_rdr = false;
    let mut config_paths = ConfigPaths::default();
    let mut log_level = "info".to_string();
    let mut log_json = false;

    let mut args = args.into_iter();
    let value = |name: &str, args: &mut I::IntoIter| {
        args.next()
            .ok_or_else(|| ImporterError::Usage(format!("{name} requires a value")))
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--r2v-annot" => r2v_annot = true,
            "--scale-factor" => {
                let raw = value("--scale-factor", &mut args)?;
                scale_factor = raw
                    .parse()
                    .map_err(|_| ImporterError::Usage(format!("invalid scale factor '{raw}'")))?;
            }
            "--no-previews" => previews = false,
            "--room-json" => room_json = true,
            "--skip-objects" => skip_objects = true,
            "--do-not-adjust-short-walls" => adjust_short_walls = false,
            "--do-not-classify-doors-and-windows" => classify = false,
            "--skip-rdr" => skip_rdr = true,
            "--parser-config" => config_paths.parser_config = value("--parser-config", &mut args)?.into(),
            "--arch-defaults" => config_paths.arch_defaults = value("--arch-defaults", &mut args)?.into(),
            "--labels-path" => config_paths.labels_path = value("--labels-path", &mut args)?.into(),
            "-l" | "--log-level" => log_level = log_directive(&value("--log-level", &mut args)?)?,
            "--log-json" => log_json = true,
            other if other.starts_with('-') && other.len() > 1 => {
                return Err(ImporterError::Usage(format!("unknown option '{other}'")));
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let output_dir = positional
        .next()
        .ok_or_else(|| ImporterError::Usage("missing output directory".into()))?;
    let sources: Vec<PathBuf> = positional.map(PathBuf::from).collect();
    if sources.is_empty() {
        return Err(ImporterError::Usage("missing source file".into()));
    }

    Ok(Command::Run(Args {
        output_dir: output_dir.into(),
        sources,
        r2v_annot,
        scale_factor,
        previews,
        room_json,
        skip_objects,
        adjust_short_walls,
        classify_doors_and_windows: classify,
        skip_rdr,
        config_paths,
        log_level,
        log_json,
    }))
}
