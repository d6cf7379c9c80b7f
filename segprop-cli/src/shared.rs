// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::PathBuf;

use clap::Args;

use segprop_core::pp::resolve_root;
use segprop_core::tr::MatchConfig;

#[derive(Debug, Clone, Args)]
pub struct MatchArgs {
    #[arg(long, help = "Weight of box IoU in the match score.", default_value_t = MatchConfig::default().iou_weight)]
    pub iou_weight: f64,

    #[arg(long, help = "Weight of center proximity in the match score.", default_value_t = MatchConfig::default().distance_weight)]
    pub distance_weight: f64,

    #[arg(long, help = "Matches must score above this value.", default_value_t = MatchConfig::default().min_score)]
    pub min_score: f64,
}

impl MatchArgs {
    pub fn config(&self) -> MatchConfig {
        MatchConfig {
            iou_weight: self.iou_weight,
            distance_weight: self.distance_weight,
            min_score: self.min_score,
            ..MatchConfig::default()
        }
    }
}

/// Exit with a command-scoped error message
pub fn fail(command: &str, message: &str) -> ! {
    eprintln!("[segprop::{}] ERROR: {}", command, message);
    std::process::exit(1);
}

/// Configure the global rayon pool when a thread count is given
pub fn init_threads(command: &str, threads: Option<usize>) {
    if let Some(threads) = threads {
        if threads < 1 {
            fail(command, "Threads must be set to a positive integer if provided.");
        }

        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .unwrap_or_else(|err| fail(command, &format!("Could not start thread pool. {}", err)));
    }
}

/// Sequence root from `--root`, `SEGPROP_ROOT`, or the working directory
pub fn sequence_root(root: &Option<String>) -> PathBuf {
    resolve_root(root.as_ref().map(PathBuf::from))
}
