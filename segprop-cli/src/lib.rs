// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

pub mod json2mask;
pub mod mask2json;
pub mod meta;
pub mod propagate;
pub mod shared;
