// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

//! Frame-to-frame propagation of polygon annotations for video sequences.
//!
//! Masks are vectorized into per-frame annotation documents (`im`), instance
//! identities are carried forward by matching against the previous frame
//! (`tr`), and single frames are propagated through an external mask
//! predictor (`pp`).

pub mod constant;
pub mod cv;
pub mod error;
pub mod im;
pub mod pp;
pub mod tr;
pub mod ut;
