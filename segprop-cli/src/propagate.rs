// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::PathBuf;

use clap::Args;

use segprop_core::im::VectorizeOptions;
use segprop_core::pp::{CommandPredictor, PropagateOptions, SequenceLayout, propagate_frame};

use crate::shared::{MatchArgs, sequence_root};

#[derive(Debug, Args)]
#[command(about = "Propagate the previous frame's annotation to a frame with an external predictor.")]
pub struct PropagateArgs {
    #[arg(help = "Frame number to annotate (e.g. 1 for frame_000001).")]
    pub frame: u64,

    #[arg(short = 'p', long, help = "Predictor program.")]
    pub predictor: String,

    #[arg(long = "predictor-arg", help = "Extra argument passed to the predictor (repeatable).", allow_hyphen_values = true)]
    pub predictor_args: Vec<String>,

    #[arg(short = 'w', long, help = "Model weight file passed to the predictor (repeatable).")]
    pub weights: Vec<String>,

    #[arg(short = 'r', long, help = "Sequence root (default: $SEGPROP_ROOT or current directory).")]
    pub root: Option<String>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,

    #[command(flatten)]
    pub matching: MatchArgs,
}

/// Propagate one frame and print the result json to stdout
pub fn propagate(args: &PropagateArgs) {
    let layout = SequenceLayout::from_root(sequence_root(&args.root));
    let predictor = CommandPredictor::new(&args.predictor, args.predictor_args.clone(), args.verbose);

    let options = PropagateOptions {
        weights: args.weights.iter().map(PathBuf::from).collect(),
        vectorize: VectorizeOptions {
            matching: args.matching.config(),
            verbose: args.verbose,
        },
    };

    let result = propagate_frame(&layout, args.frame, &predictor, &options);

    match serde_json::to_string(&result) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("[segprop::propagate] ERROR: Failed to serialize result. {}", err);
            std::process::exit(1);
        }
    }

    if !result.success {
        std::process::exit(1);
    }
}
