// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::PathBuf;
use std::process::Command;

use crate::error::SegpropError;
use crate::ut::track::progress_log;

/// Everything an external mask predictor needs for one frame pair
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    /// Frame numbers whose masks are provided as references
    pub reference_frames: Vec<u64>,
    /// Directory with the staged frame images
    pub images_dir: PathBuf,
    /// Directory with the staged reference masks
    pub masks_dir: PathBuf,
    /// Directory receiving `masks/frame_%06d.png`
    pub output_dir: PathBuf,
    /// Model weight files
    pub weights: Vec<PathBuf>,
}

/// A mask predictor that propagates reference masks to the staged frames
///
/// Implementations must write the predicted mask of each non-reference
/// frame into the `masks` subdirectory of the request's output directory.
pub trait Predictor {
    fn predict(&self, request: &PredictionRequest) -> Result<(), SegpropError>;
}

/// Runs a predictor as an external program
///
/// The program is invoked as
///
/// ```text
/// <program> [args..] --images <dir> --masks <dir> --output <dir>
///           --reference <n>[,<n>..] [--weights <path>]..
/// ```
///
/// and must exit with status zero on success.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandPredictor {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub verbose: bool,
}

impl CommandPredictor {
    pub fn new<P: Into<PathBuf>>(program: P, args: Vec<String>, verbose: bool) -> Self {
        CommandPredictor {
            program: program.into(),
            args,
            verbose,
        }
    }

    fn command(&self, request: &PredictionRequest) -> Command {
        let reference = request
            .reference_frames
            .iter()
            .map(u64::to_string)
            .collect::<Vec<String>>()
            .join(",");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--images")
            .arg(&request.images_dir)
            .arg("--masks")
            .arg(&request.masks_dir)
            .arg("--output")
            .arg(&request.output_dir)
            .arg("--reference")
            .arg(reference);

        for weights in request.weights.iter() {
            cmd.arg("--weights").arg(weights);
        }

        cmd
    }
}

impl Predictor for CommandPredictor {
    fn predict(&self, request: &PredictionRequest) -> Result<(), SegpropError> {
        progress_log(
            &format!("Running predictor {}.", self.program.display()),
            self.verbose,
        );

        let output = self.command(request).output().map_err(|err| {
            SegpropError::PredictorError(format!(
                "Failed to execute {}: {}",
                self.program.display(),
                err
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SegpropError::PredictorError(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
