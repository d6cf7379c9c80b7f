// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::SegpropError;
use crate::im::{MetaIndex, VectorizeOptions, vectorize_file};
use crate::pp::{PredictionRequest, Predictor, SequenceLayout, SequenceLock, StagingArea};
use crate::ut::path::ensure_directory;
use crate::ut::track::progress_log;

/// Steps of a single frame propagation, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    Staged,
    Predicted,
    Relocated,
    MetaRefreshed,
    Vectorized,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Staged => "staged",
            Stage::Predicted => "predicted",
            Stage::Relocated => "relocated",
            Stage::MetaRefreshed => "meta-refreshed",
            Stage::Vectorized => "vectorized",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Options for propagating a frame
#[derive(Debug, Clone, Default)]
pub struct PropagateOptions {
    /// Model weights handed to the predictor
    pub weights: Vec<PathBuf>,
    pub vectorize: VectorizeOptions,
}

/// Structured outcome of a propagation, printed as json by the CLI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
    /// Last stage completed before success or failure
    #[serde(skip)]
    pub reached: Stage,
}

/// Propagate the annotation of frame `frame - 1` to frame `frame`
///
/// The previous frame and its mask are staged for the predictor, the
/// predicted mask is moved into the durable masks directory, the meta
/// index is rebuilt from all annotation documents, and the new mask is
/// vectorized with identities matched against the previous frame.
///
/// Every failure is captured in the returned [`FrameResult`]. Staging
/// directories and the sequence lock are released on every path.
///
/// # Examples
///
/// ```no_run
/// use segprop_core::pp::{CommandPredictor, PropagateOptions, SequenceLayout, propagate_frame};
///
/// let layout = SequenceLayout::from_root("sequence/");
/// let predictor = CommandPredictor::new("predict-masks", Vec::new(), false);
///
/// let result = propagate_frame(&layout, 1, &predictor, &PropagateOptions::default());
/// println!("{}", serde_json::to_string(&result).unwrap());
/// ```
pub fn propagate_frame(
    layout: &SequenceLayout,
    frame: u64,
    predictor: &dyn Predictor,
    options: &PropagateOptions,
) -> FrameResult {
    let mut stage = Stage::Init;

    match run(layout, frame, predictor, options, &mut stage) {
        Ok(output) => {
            progress_log(
                &format!("Frame {} annotated in {}.", frame, output.display()),
                options.vectorize.verbose,
            );

            FrameResult {
                success: true,
                message: format!("Successfully processed frame {}", frame),
                error: None,
                reached: Stage::Done,
            }
        }
        Err(err) => {
            progress_log(
                &format!("Frame {}: {} -> {}. {}", frame, stage, Stage::Failed, err),
                options.vectorize.verbose,
            );

            FrameResult {
                success: false,
                message: format!("Error processing frame {}: {}", frame, err),
                error: Some(err.to_string()),
                reached: stage,
            }
        }
    }
}

fn run(
    layout: &SequenceLayout,
    frame: u64,
    predictor: &dyn Predictor,
    options: &PropagateOptions,
    stage: &mut Stage,
) -> Result<PathBuf, SegpropError> {
    let verbose = options.vectorize.verbose;

    if !layout.root.is_dir() {
        return Err(SegpropError::MissingInput(format!(
            "Sequence root not found: {}",
            layout.root.display()
        )));
    }

    // Staging is only touched while holding the lock
    let _lock = SequenceLock::acquire(layout.lock_path())?;
    let staging = StagingArea::new(&layout.staged_frames_dir, &layout.staged_masks_dir)?;

    if frame == 0 {
        return Err(SegpropError::MissingInput(
            "Cannot process frame 0, the first frame must be annotated manually".to_string(),
        ));
    }

    let previous = frame - 1;

    let reference_mask = layout.mask_path(previous);
    if !reference_mask.is_file() {
        return Err(SegpropError::MissingInput(format!(
            "Previous frame's mask not found: {}",
            reference_mask.display()
        )));
    }

    let current_frame = layout.frame_path(frame);
    if !current_frame.is_file() {
        return Err(SegpropError::MissingInput(format!(
            "Current frame not found: {}",
            current_frame.display()
        )));
    }

    staging.stage_frame(layout.frame_path(previous))?;
    staging.stage_frame(&current_frame)?;
    staging.stage_mask(&reference_mask)?;
    *stage = Stage::Staged;

    progress_log(
        &format!("Staged frames {} and {} for prediction.", previous, frame),
        verbose,
    );

    ensure_directory(&layout.predictions_dir)?;

    predictor.predict(&PredictionRequest {
        reference_frames: vec![previous],
        images_dir: staging.frames_dir().to_path_buf(),
        masks_dir: staging.masks_dir().to_path_buf(),
        output_dir: layout.predictions_dir.clone(),
        weights: options.weights.clone(),
    })?;
    *stage = Stage::Predicted;

    let predicted = layout.predicted_mask_path(frame);
    if !predicted.is_file() {
        return Err(SegpropError::PredictorOutputMissing(format!(
            "Model did not generate mask for frame {}: {}",
            frame,
            predicted.display()
        )));
    }

    let mask = layout.mask_path(frame);
    relocate(&predicted, &mask)?;
    *stage = Stage::Relocated;

    drop(staging);

    ensure_directory(&layout.annotations_dir)?;
    let index = MetaIndex::rebuild_to(&layout.annotations_dir, layout.meta_path(), verbose)?;
    *stage = Stage::MetaRefreshed;

    let output = vectorize_file(&mask, &layout.annotations_dir, Some(&index), &options.vectorize)?;
    *stage = Stage::Vectorized;

    Ok(output)
}

/// Move a file, falling back to copy and remove across file systems
fn relocate(source: &Path, destination: &Path) -> Result<(), SegpropError> {
    if let Some(parent) = destination.parent() {
        ensure_directory(parent)?;
    }

    if std::fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    std::fs::copy(source, destination)
        .and_then(|_| std::fs::remove_file(source))
        .map_err(|err| {
            SegpropError::OtherError(format!(
                "Failed to move {} to {}: {}",
                source.display(),
                destination.display(),
                err
            ))
        })
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::im::{AnnotationDocument, ColorMask};
    use std::cell::Cell;

    fn square_mask(rect: [usize; 4]) -> ColorMask {
        let mut mask = ColorMask::blank(96, 96);
        for y in rect[1]..=rect[3] {
            for x in rect[0]..=rect[2] {
                mask.buffer[y * 96 + x] = [255, 0, 0];
            }
        }
        mask
    }

    /// A sequence root with an annotated frame 0 and an unannotated frame 1
    fn sequence() -> (tempfile::TempDir, SequenceLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = SequenceLayout::from_root(dir.path());

        std::fs::create_dir_all(&layout.frames_dir).unwrap();
        std::fs::create_dir_all(&layout.masks_dir).unwrap();

        std::fs::write(layout.frame_path(0), b"frame").unwrap();
        std::fs::write(layout.frame_path(1), b"frame").unwrap();

        square_mask([10, 10, 50, 50]).save(layout.mask_path(0)).unwrap();
        vectorize_file(
            layout.mask_path(0),
            &layout.annotations_dir,
            None,
            &VectorizeOptions::default(),
        )
        .unwrap();

        (dir, layout)
    }

    fn assert_released(layout: &SequenceLayout) {
        assert!(!layout.staged_frames_dir.exists());
        assert!(!layout.staged_masks_dir.exists());
        assert!(!layout.lock_path().exists());
    }

    struct WritingPredictor;

    impl Predictor for WritingPredictor {
        fn predict(&self, request: &PredictionRequest) -> Result<(), SegpropError> {
            assert_eq!(std::fs::read_dir(&request.images_dir).unwrap().count(), 2);
            assert_eq!(std::fs::read_dir(&request.masks_dir).unwrap().count(), 1);

            let target = request.reference_frames[0] + 1;
            let output = request.output_dir.join("masks");
            std::fs::create_dir_all(&output).unwrap();

            let mut mask = square_mask([12, 11, 52, 51]);
            for y in 70..=90 {
                for x in 70..=90 {
                    mask.buffer[y * 96 + x] = [255, 0, 0];
                }
            }
            mask.save(output.join(format!("frame_{:06}.png", target)))
        }
    }

    struct SilentPredictor;

    impl Predictor for SilentPredictor {
        fn predict(&self, _request: &PredictionRequest) -> Result<(), SegpropError> {
            Ok(())
        }
    }

    struct FailingPredictor;

    impl Predictor for FailingPredictor {
        fn predict(&self, _request: &PredictionRequest) -> Result<(), SegpropError> {
            Err(SegpropError::PredictorError("out of memory".to_string()))
        }
    }

    struct CountingPredictor {
        calls: Cell<usize>,
    }

    impl Predictor for CountingPredictor {
        fn predict(&self, _request: &PredictionRequest) -> Result<(), SegpropError> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_propagate_success() {
        let (_dir, layout) = sequence();

        let result = propagate_frame(&layout, 1, &WritingPredictor, &PropagateOptions::default());

        assert!(result.success, "{}", result.message);
        assert_eq!(result.reached, Stage::Done);
        assert_eq!(result.error, None);
        assert!(layout.mask_path(1).is_file());
        assert!(!layout.predicted_mask_path(1).exists());
        assert_released(&layout);

        let meta = MetaIndex::open(layout.meta_path()).unwrap();
        assert_eq!(meta.expected("frame_000001").unwrap()[0].bbox, Some([10, 10, 50, 50]));

        let document = AnnotationDocument::open(layout.annotations_dir.join("frame_000001.json")).unwrap();
        let ids: Vec<&str> = document.instances().map(|(_, i)| i.instance_id.as_str()).collect();
        assert_eq!(ids, vec!["Object-1", "Object-2"]);
    }

    #[test]
    fn test_propagate_missing_output() {
        let (_dir, layout) = sequence();

        let result = propagate_frame(&layout, 1, &SilentPredictor, &PropagateOptions::default());

        assert!(!result.success);
        assert_eq!(result.reached, Stage::Predicted);
        assert!(result.error.unwrap().contains("PredictorOutputMissing"));
        assert_released(&layout);
    }

    #[test]
    fn test_propagate_predictor_failure() {
        let (_dir, layout) = sequence();

        let result = propagate_frame(&layout, 1, &FailingPredictor, &PropagateOptions::default());

        assert!(!result.success);
        assert_eq!(result.reached, Stage::Staged);
        assert!(result.message.starts_with("Error processing frame 1"));
        assert!(!layout.mask_path(1).exists());
        assert_released(&layout);
    }

    #[test]
    fn test_propagate_frame_zero_never_predicts() {
        let (_dir, layout) = sequence();
        let predictor = CountingPredictor { calls: Cell::new(0) };

        let result = propagate_frame(&layout, 0, &predictor, &PropagateOptions::default());

        assert!(!result.success);
        assert_eq!(result.reached, Stage::Init);
        assert!(result.error.unwrap().contains("MissingInput"));
        assert_eq!(predictor.calls.get(), 0);
        assert_released(&layout);
    }

    #[test]
    fn test_propagate_missing_reference_mask() {
        let (_dir, layout) = sequence();
        let predictor = CountingPredictor { calls: Cell::new(0) };

        let result = propagate_frame(&layout, 5, &predictor, &PropagateOptions::default());

        assert!(!result.success);
        assert!(result.error.unwrap().contains("MissingInput"));
        assert_eq!(predictor.calls.get(), 0);
    }

    #[test]
    fn test_propagate_clears_stale_staging_on_invalid_input() {
        let (_dir, layout) = sequence();

        for frame in [0, 3] {
            std::fs::create_dir_all(&layout.staged_frames_dir).unwrap();
            std::fs::create_dir_all(&layout.staged_masks_dir).unwrap();
            std::fs::write(layout.staged_frames_dir.join("frame_000007.jpg"), b"stale").unwrap();
            std::fs::write(layout.staged_masks_dir.join("frame_000007.png"), b"stale").unwrap();

            let result = propagate_frame(&layout, frame, &SilentPredictor, &PropagateOptions::default());

            assert!(!result.success);
            assert!(result.error.unwrap().contains("MissingInput"));
            assert_released(&layout);
        }
    }

    #[test]
    fn test_propagate_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let layout = SequenceLayout::from_root(dir.path().join("missing"));

        let result = propagate_frame(&layout, 0, &SilentPredictor, &PropagateOptions::default());

        assert!(!result.success);
        assert!(result.error.unwrap().contains("MissingInput"));
        assert!(!layout.root.exists());
    }

    #[test]
    fn test_propagate_locked_sequence() {
        let (_dir, layout) = sequence();
        let _lock = SequenceLock::acquire(layout.lock_path()).unwrap();

        let result = propagate_frame(&layout, 1, &WritingPredictor, &PropagateOptions::default());

        assert!(!result.success);
        assert!(result.error.unwrap().contains("SequenceLocked"));
        assert!(!layout.staged_frames_dir.exists());
    }

    #[test]
    fn test_result_json_shape() {
        let result = FrameResult {
            success: false,
            message: "Error processing frame 0".to_string(),
            error: None,
            reached: Stage::Init,
        };

        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"success":false,"message":"Error processing frame 0","error":null}"#
        );
    }
}
