extern crate log;
extern crate pretty_env_logger;

use std::path::PathBuf;
use std::process::exit;

use clap::{arg, command, Command};
use rayon::prelude::*;
use rusttype::Font;

use omr_grader::debug::{draw_scored_sheet_debug_image_mut, ImageDebugWriter};
use omr_grader::grade::grade_sheet;
use omr_grader::sheet::{standard_sheet_geometry, AnswerKey, SheetGeometry};

fn main() {
    pretty_env_logger::init_custom_env("LOG");

    let matches = cli().get_matches();
    let debug = matches.get_flag("debug");
    let answers = matches
        .get_one::<String>("answers")
        .expect("answer key is required");
    let sheet_paths = matches
        .get_many::<String>("sheet_paths")
        .expect("at least one sheet image path is required")
        .cloned()
        .collect::<Vec<String>>();

    let answer_key = match AnswerKey::parse(answers) {
        Ok(answer_key) => answer_key,
        Err(e) => {
            eprintln!("Error parsing answer key: {}", e);
            exit(1);
        }
    };

    let font = matches.get_one::<String>("font").map(|font_path| {
        let bytes = match std::fs::read(font_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error reading font {}: {}", font_path, e);
                exit(1);
            }
        };
        match Font::try_from_vec(bytes) {
            Some(font) => font,
            None => {
                eprintln!("Error loading font {}", font_path);
                exit(1);
            }
        }
    });

    let geometry = standard_sheet_geometry();

    // Each sheet is an independent pipeline run over its own buffers, so a
    // batch can be graded in parallel.
    let outcomes = sheet_paths
        .par_iter()
        .map(|sheet_path| {
            let outcome =
                grade_sheet_file(sheet_path, &answer_key, &geometry, debug, font.as_ref());
            (sheet_path, outcome)
        })
        .collect::<Vec<_>>();

    let mut failed = false;
    for (sheet_path, outcome) in outcomes {
        match outcome {
            Ok(result_json) => println!("{}: {}", sheet_path, result_json),
            Err(message) => {
                failed = true;
                eprintln!("{}: {}", sheet_path, message);
            }
        }
    }

    if failed {
        exit(1);
    }
}

fn grade_sheet_file(
    sheet_path: &str,
    answer_key: &AnswerKey,
    geometry: &SheetGeometry,
    debug: bool,
    font: Option<&Font>,
) -> Result<String, String> {
    let image_bytes =
        std::fs::read(sheet_path).map_err(|e| format!("Error reading sheet image: {}", e))?;

    let graded = grade_sheet(&image_bytes, answer_key, geometry).map_err(|e| {
        log::warn!("grading {} failed: {}", sheet_path, e);
        format!("Error grading sheet: {}", e)
    })?;

    log::info!(
        "graded {}: {}/{}",
        sheet_path,
        graded.result.score,
        graded.result.total_questions
    );

    let debug_writer = if debug {
        match image::load_from_memory(&image_bytes) {
            Ok(img) => ImageDebugWriter::new(PathBuf::from(sheet_path), img.to_rgb8()),
            Err(_) => ImageDebugWriter::disabled(),
        }
    } else {
        ImageDebugWriter::disabled()
    };
    debug_writer.write("scored", |canvas| {
        draw_scored_sheet_debug_image_mut(canvas, &graded, answer_key, font);
    });

    serde_json::to_string(&graded.result).map_err(|e| format!("Error serializing result: {}", e))
}

fn cli() -> Command {
    command!()
        .arg(
            arg!(-a --answers <ANSWERS> "Comma-separated 1-based answer key, e.g. \"1,4,2,3\"")
                .required(true),
        )
        .arg(arg!(-d --debug "Write an annotated debug image next to each sheet"))
        .arg(arg!(--font <FONT> "Font file used to label debug images with fill counts"))
        .arg(arg!(sheet_paths: <SHEET_IMAGE> ... "Path to a scanned sheet image").required(true))
}
