// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::PathBuf;
use std::sync::Mutex;

use clap::Args;
use kdam::TqdmParallelIterator;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use segprop_core::constant;
use segprop_core::im::rasterize_file;
use segprop_core::pp::SequenceLayout;
use segprop_core::ut;

use crate::shared::{fail, init_threads, sequence_root};

const COMMAND: &str = "json2mask";

#[derive(Debug, Args)]
#[command(about = "Paint polygon annotation documents back into color-coded masks.")]
pub struct Json2maskArgs {
    #[arg(short = 'i', long, help = "Annotation document or directory (default: <root>/json).")]
    pub input: Option<String>,

    #[arg(short = 'o', long, help = "Output directory (default: <root>/Annotations).")]
    pub output: Option<String>,

    #[arg(short = 'f', long, help = "Frame image directory (default: <root>/JPEGImages).")]
    pub frames: Option<String>,

    #[arg(short = 'r', long, help = "Sequence root (default: $SEGPROP_ROOT or current directory).")]
    pub root: Option<String>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,

    #[arg(short = 't', long, help = "Number of threads.")]
    pub threads: Option<usize>,
}

pub fn json2mask(args: &Json2maskArgs) {
    init_threads(COMMAND, args.threads);

    let layout = SequenceLayout::from_root(sequence_root(&args.root));

    let input = args.input.as_ref().map_or(layout.annotations_dir.clone(), PathBuf::from);
    let output = args.output.as_ref().map_or(layout.masks_dir.clone(), PathBuf::from);
    let frames = args.frames.as_ref().map_or(layout.frames_dir.clone(), PathBuf::from);

    if !frames.is_dir() {
        fail(COMMAND, &format!("Frame directory {} does not exist.", frames.display()));
    }

    if input.is_file() {
        match rasterize_file(&input, &frames, &output, args.verbose) {
            Ok(path) => ut::track::progress_log(
                &format!("Complete. Mask written to {}.", path.display()),
                args.verbose,
            ),
            Err(err) => fail(COMMAND, &err.to_string()),
        }
        return;
    }

    if !input.is_dir() {
        fail(COMMAND, &format!("Input {} does not exist.", input.display()));
    }

    let documents: Vec<PathBuf> =
        ut::path::collect_file_paths(&input, constant::SUPPORTED_ARRAY_FORMATS.as_slice(), None)
            .unwrap_or_else(|err| fail(COMMAND, &err.to_string()))
            .into_iter()
            .filter(|path| path.file_name().is_some_and(|name| name != constant::META_FILENAME))
            .collect();

    if documents.is_empty() {
        fail(COMMAND, "No annotation documents were detected.");
    }

    ut::track::progress_log(
        &format!(
            "Detected {} annotation documents.",
            ut::track::thousands_format(documents.len())
        ),
        args.verbose,
    );

    let pb = ut::track::progress_bar(documents.len(), "Converting json to masks", args.verbose);

    let error: Mutex<Vec<usize>> = Mutex::new(Vec::with_capacity(documents.len()));

    (0..documents.len())
        .into_par_iter()
        .tqdm_with_bar(pb)
        .for_each(|idx| {
            if let Err(err) = rasterize_file(&documents[idx], &frames, &output, false) {
                ut::track::progress_warn(&format!("{}: {}", documents[idx].display(), err));
                if let Ok(mut error) = error.lock() {
                    error.push(idx);
                }
            }
        });

    let error = error.into_inner().unwrap_or_default();

    if args.verbose {
        eprintln!()
    }

    if error.is_empty() {
        ut::track::progress_log(
            &format!(
                "Complete. {} documents converted to masks.",
                ut::track::thousands_format(documents.len()),
            ),
            args.verbose,
        );
    } else {
        ut::track::progress_warn(&format!(
            "Complete. {} documents successfully converted to masks. {} documents failed.",
            ut::track::thousands_format(documents.len() - error.len()),
            ut::track::thousands_format(error.len())
        ));
    }
}
