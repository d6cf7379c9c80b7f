// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

pub mod layout;
pub mod lock;
pub mod orchestrator;
pub mod predictor;
pub mod staging;

pub use layout::{SequenceLayout, resolve_root};
pub use lock::SequenceLock;
pub use orchestrator::{FrameResult, PropagateOptions, Stage, propagate_frame};
pub use predictor::{CommandPredictor, PredictionRequest, Predictor};
pub use staging::StagingArea;
