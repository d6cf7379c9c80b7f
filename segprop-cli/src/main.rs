// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use clap::{Parser, Subcommand};
use segprop_cli::{json2mask, mask2json, meta, propagate};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Mask2json(mask2json::Mask2jsonArgs),
    Json2mask(json2mask::Json2maskArgs),
    Meta(meta::MetaArgs),
    Propagate(propagate::PropagateArgs),
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Mask2json(mask2json_args)) => mask2json::mask2json(mask2json_args),
        Some(Commands::Json2mask(json2mask_args)) => json2mask::json2mask(json2mask_args),
        Some(Commands::Meta(meta_args)) => meta::meta(meta_args),
        Some(Commands::Propagate(propagate_args)) => propagate::propagate(propagate_args),
        None => {}
    }
}
