// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of one R2V file into scene outputs.

use std::fs;
use std::path::{Path, PathBuf};

use r2v_floorplan::{reconstruct, ParserConfig, PipelineOptions, SourceKind};
use serde::Serialize;

use super::preview::{sketch_raw_annotations, sketch_room};
use super::scene::SceneBuilder;
use crate::cli::Args;
use crate::config::ArchDefaults;
use crate::error::{ImporterError, Result};

/// Everything a conversion needs besides the source path.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub parser: ParserConfig,
    pub arch: ArchDefaults,
    pub room_types: Vec<String>,
    pub options: PipelineOptions,
    pub scale_factor: f64,
    pub previews: bool,
    pub room_json: bool,
    pub adjust_short_walls: bool,
}

impl ImportSettings {
    pub fn from_args(args: &Args, parser: ParserConfig, arch: ArchDefaults, room_types: Vec<String>) -> Self {
        Self {
            parser,
            arch,
            room_types,
            options: PipelineOptions {
                source_kind: if args.r2v_annot {
                    SourceKind::R2vAnnotation
                } else {
                    SourceKind::R2vOutput
                },
                collect_objects: !args.skip_objects,
                classify_openings: args.classify_doors_and_windows,
                compute_rdr: !args.skip_rdr,
            },
            scale_factor: args.scale_factor,
            previews: args.previews,
            room_json: args.room_json,
            adjust_short_walls: args.adjust_short_walls,
        }
    }
}

/// Result of converting one file
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub source: PathBuf,
    pub scene_id: String,
    pub rooms: usize,
    pub walls: usize,
    pub rdr_edges: usize,
    pub files: Vec<PathBuf>,
}

/// Scene id of a source: its file stem.
pub fn scene_id(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".into())
}

fn write_json<T: Serialize>(path: &Path, value: &T, files: &mut Vec<PathBuf>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).map_err(ImporterError::io(path))?;
    tracing::info!(path = %path.display(), "Saved");
    files.push(path.to_path_buf());
    Ok(())
}

/// Convert `source` and write its outputs into `output_dir`.
pub fn convert_file(source: &Path, output_dir: &Path, settings: &ImportSettings) -> Result<ConversionSummary> {
    fs::create_dir_all(output_dir).map_err(ImporterError::io(output_dir))?;
    let text = fs::read_to_string(source).map_err(ImporterError::io(source))?;
    let id = scene_id(source);

    tracing::info!(file = %source.display(), scene = %id, "Converting");
    let house = reconstruct(
        &source.display().to_string(),
        &text,
        &settings.parser,
        &settings.options,
        &settings.room_types,
    )?;

    let builder = SceneBuilder::new(
        &house,
        &settings.arch,
        id.clone(),
        settings.scale_factor,
        settings.adjust_short_walls,
    )?;
    let mut files = Vec::new();

    if settings.previews {
        let path = output_dir.join("raw_annot.png");
        sketch_raw_annotations(&house, &settings.room_types, &path)?;
        files.push(path);
    }

    for index in 0..house.rooms.len() {
        if settings.previews {
            let path = output_dir.join(format!("room_{index}.png"));
            sketch_room(&house, index, &path)?;
            files.push(path);
        }

        if settings.room_json {
            let room_id = house
                .rooms
                .iter()
                .nth(index)
                .and_then(|r| r.room_id.clone())
                .ok_or(ImporterError::MissingRoomId(index))?;
            let path = output_dir.join(format!("{room_id}.arch.json"));
            write_json(&path, &builder.room_arch(index)?, &mut files)?;
        }
    }

    write_json(&output_dir.join(format!("{id}.scene.json")), &builder.scene()?, &mut files)?;
    write_json(
        &output_dir.join(format!("{id}.objectaabb.json")),
        &builder.object_aabb(),
        &mut files,
    )?;

    Ok(ConversionSummary {
        source: source.to_path_buf(),
        scene_id: id,
        rooms: house.rooms.len(),
        walls: house.graph.wall_count(),
        rdr_edges: house.rdr.len(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{parse_args, Command};
    use crate::logging::{file_layer, LOG_FILE};
    use serde_json::Value;
    use tracing_subscriber::layer::SubscriberExt;

    fn settings(extra: &[&str]) -> ImportSettings {
        let mut argv = vec!["out".to_string(), "plan.txt".to_string()];
        argv.extend(extra.iter().map(|s| s.to_string()));
        let Command::Run(args) = parse_args(argv).unwrap() else {
            panic!("expected run");
        };
        let room_types = ["bedroom", "kitchen", "outside"].iter().map(|s| s.to_string()).collect();
        ImportSettings::from_args(&args, ParserConfig::default(), ArchDefaults::default(), room_types)
    }

    const ANNOTATION: &str = "\
0\t0\t200\t0\twall\t1\t1
200\t0\t200\t100\twall\t1\t1
200\t100\t0\t100\twall\t1\t1
0\t100\t0\t0\twall\t1\t1
100\t0\t100\t100\twall\t1\t1
100\t40\t100\t60\tdoor\t1\t1
20\t20\t80\t80\tbedroom\t1\t1
120\t20\t180\t80\tkitchen\t1\t1
";

    #[test]
    fn test_convert_annotation_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("plan_7.txt");
        fs::write(&source, ANNOTATION).unwrap();
        let out = dir.path().join("out");

        let summary = convert_file(&source, &out, &settings(&["--r2v-annot", "--room-json"])).unwrap();
        assert_eq!(summary.scene_id, "plan_7");
        assert_eq!(summary.rooms, 2);
        assert_eq!(summary.rdr_edges, 2);

        for name in ["raw_annot.png", "room_0.png", "room_1.png", "plan_7.scene.json", "plan_7.objectaabb.json"] {
            assert!(out.join(name).exists(), "{name} missing");
        }
        let arch_files = fs::read_dir(&out)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".arch.json"))
            .count();
        assert_eq!(arch_files, 2);

        let scene: Value = serde_json::from_str(&fs::read_to_string(out.join("plan_7.scene.json")).unwrap()).unwrap();
        assert_eq!(scene["scene"]["arch"]["id"], "plan_7");
        let types: Vec<&str> = scene["scene"]["arch"]["rooms"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|r| r["types"].as_array().unwrap().iter().map(|t| t.as_str().unwrap()))
            .collect();
        assert!(types.contains(&"bedroom") && types.contains(&"kitchen"));
    }

    #[test]
    fn test_no_previews() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("plan.txt");
        fs::write(&source, ANNOTATION).unwrap();
        let out = dir.path().join("out");

        let summary = convert_file(&source, &out, &settings(&["--r2v-annot", "--no-previews"])).unwrap();
        assert_eq!(summary.files.len(), 2);
        assert!(!out.join("raw_annot.png").exists());
    }

    #[test]
    fn test_parse_error_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.txt");
        fs::write(&source, "0\t0\t10\n").unwrap();
        let err = convert_file(&source, dir.path(), &settings(&["--r2v-annot"])).unwrap_err();
        assert!(matches!(
            err,
            ImporterError::Floorplan(r2v_floorplan::Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_conversion_logged_to_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("plan_3.txt");
        fs::write(&source, ANNOTATION).unwrap();
        let out = dir.path().join("out");

        let subscriber = tracing_subscriber::registry().with(file_layer(&out).unwrap());
        let summary = tracing::subscriber::with_default(subscriber, || {
            convert_file(&source, &out, &settings(&["--r2v-annot", "--no-previews"]))
        })
        .unwrap();
        assert_eq!(summary.rooms, 2);

        let log = fs::read_to_string(out.join(LOG_FILE)).unwrap();
        assert!(log.contains("Converting"));
        assert!(log.contains("Reconstructed floor plan"));
        assert!(log.contains("plan_3.scene.json"));
        assert!(!log.contains('\u{1b}'));

        // A second run appends
        let subscriber = tracing_subscriber::registry().with(file_layer(&out).unwrap());
        tracing::subscriber::with_default(subscriber, || tracing::info!("second run"));
        let log = fs::read_to_string(out.join(LOG_FILE)).unwrap();
        assert!(log.contains("Converting") && log.contains("second run"));
    }
}
