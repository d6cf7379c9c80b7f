// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Args;
use kdam::TqdmParallelIterator;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use segprop_core::constant;
use segprop_core::im::{MetaIndex, VectorizeOptions, vectorize_file};
use segprop_core::pp::SequenceLayout;
use segprop_core::ut;

use crate::shared::{MatchArgs, fail, init_threads, sequence_root};

const COMMAND: &str = "mask2json";

#[derive(Debug, Args)]
#[command(about = "Convert color-coded or label masks into polygon annotation documents.")]
pub struct Mask2jsonArgs {
    #[arg(short = 'i', long, help = "Mask or mask directory.", required = true)]
    pub mask: Option<String>,

    #[arg(short = 'o', long, help = "Output directory (default: <root>/json).")]
    pub output: Option<String>,

    #[arg(short = 'm', long, help = "Meta index used to keep instance identities.")]
    pub meta: Option<String>,

    #[arg(short = 'r', long, help = "Sequence root (default: $SEGPROP_ROOT or current directory).")]
    pub root: Option<String>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,

    #[arg(long, help = "Substring specifying masks (e.g. frame_).")]
    pub mask_substring: Option<String>,

    #[arg(short = 't', long, help = "Number of threads.")]
    pub threads: Option<usize>,

    #[command(flatten)]
    pub matching: MatchArgs,
}

pub fn mask2json(args: &Mask2jsonArgs) {
    init_threads(COMMAND, args.threads);

    let Some(mask_path) = args.mask.as_ref().map(PathBuf::from) else {
        fail(COMMAND, "A mask or mask directory must be provided.");
    };

    let output = match args.output.as_ref() {
        Some(output) => PathBuf::from(output),
        None => SequenceLayout::from_root(sequence_root(&args.root)).annotations_dir,
    };

    let meta = args
        .meta
        .as_ref()
        .map(|path| MetaIndex::open_or_empty(path, args.verbose));

    let options = VectorizeOptions {
        matching: args.matching.config(),
        verbose: args.verbose,
    };

    if mask_path.is_dir() {
        mask2json_dir(&mask_path, &output, meta.as_ref(), &options, args);
    } else {
        if !mask_path.is_file() {
            fail(COMMAND, &format!("Mask {} does not exist.", mask_path.display()));
        }

        let extension = mask_path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        if !constant::SUPPORTED_MASK_FORMATS.contains(&extension.as_str()) {
            fail(
                COMMAND,
                &format!(
                    "Invalid mask extension {}. Must be one of: {:?}.",
                    extension,
                    constant::SUPPORTED_MASK_FORMATS
                ),
            );
        }

        match vectorize_file(&mask_path, &output, meta.as_ref(), &options) {
            Ok(path) => ut::track::progress_log(
                &format!("Complete. Annotation written to {}.", path.display()),
                args.verbose,
            ),
            Err(err) => fail(COMMAND, &err.to_string()),
        }
    }
}

fn mask2json_dir(
    mask_dir: &Path,
    output: &Path,
    meta: Option<&MetaIndex>,
    options: &VectorizeOptions,
    args: &Mask2jsonArgs,
) {
    let mask_files = ut::path::collect_file_paths(
        mask_dir,
        constant::SUPPORTED_MASK_FORMATS.as_slice(),
        args.mask_substring.to_owned(),
    )
    .unwrap_or_else(|err| fail(COMMAND, &err.to_string()));

    if mask_files.is_empty() {
        fail(
            COMMAND,
            "No mask files were detected. Please check your path and/or substring identifier.",
        );
    }

    ut::track::progress_log(
        &format!(
            "Detected {} masks.",
            ut::track::thousands_format(mask_files.len())
        ),
        args.verbose,
    );

    ut::path::ensure_directory(output).unwrap_or_else(|err| fail(COMMAND, &err.to_string()));

    // Per-mask logging would interleave with the progress bar
    let item_options = VectorizeOptions {
        verbose: false,
        ..options.clone()
    };

    let pb = ut::track::progress_bar(mask_files.len(), "Converting masks to json", args.verbose);

    let error: Mutex<Vec<usize>> = Mutex::new(Vec::with_capacity(mask_files.len()));

    (0..mask_files.len())
        .into_par_iter()
        .tqdm_with_bar(pb)
        .for_each(|idx| {
            if let Err(err) = vectorize_file(&mask_files[idx], output, meta, &item_options) {
                ut::track::progress_warn(&format!("{}: {}", mask_files[idx].display(), err));
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
                "Complete. {} masks converted to json.",
                ut::track::thousands_format(mask_files.len()),
            ),
            args.verbose,
        );
    } else {
        ut::track::progress_warn(&format!(
            "Complete. {} masks successfully converted to json. {} masks failed.",
            ut::track::thousands_format(mask_files.len() - error.len()),
            ut::track::thousands_format(error.len())
        ));
    }
}
