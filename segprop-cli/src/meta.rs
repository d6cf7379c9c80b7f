// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::PathBuf;

use clap::Args;

use segprop_core::im::MetaIndex;
use segprop_core::pp::SequenceLayout;
use segprop_core::ut;

use crate::shared::{fail, sequence_root};

const COMMAND: &str = "meta";

#[derive(Debug, Args)]
#[command(about = "Rebuild the meta index of instances expected in each next frame.")]
pub struct MetaArgs {
    #[arg(short = 'i', long, help = "Annotation document directory (default: <root>/json).")]
    pub input: Option<String>,

    #[arg(short = 'o', long, help = "Output meta index (default: <root>/predicted_masks/meta.json).")]
    pub output: Option<String>,

    #[arg(short = 'r', long, help = "Sequence root (default: $SEGPROP_ROOT or current directory).")]
    pub root: Option<String>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,
}

pub fn meta(args: &MetaArgs) {
    let layout = SequenceLayout::from_root(sequence_root(&args.root));

    let input = args.input.as_ref().map_or(layout.annotations_dir.clone(), PathBuf::from);
    let output = args.output.as_ref().map_or(layout.meta_path(), PathBuf::from);

    if !input.is_dir() {
        fail(COMMAND, &format!("Annotation directory {} does not exist.", input.display()));
    }

    match MetaIndex::rebuild_to(&input, &output, args.verbose) {
        Ok(index) => ut::track::progress_log(
            &format!(
                "Complete. Expected instances for {} frames written to {}.",
                ut::track::thousands_format(index.len()),
                output.display()
            ),
            args.verbose,
        ),
        Err(err) => fail(COMMAND, &err.to_string()),
    }
}
