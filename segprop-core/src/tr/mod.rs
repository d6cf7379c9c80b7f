// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

pub mod matcher;

pub use matcher::{Assignment, InstanceMatcher, Match, MatchConfig, find_best_match, score};
