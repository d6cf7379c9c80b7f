#![allow(clippy::all)]
use clap::{Parser, Subcommand};
use clap_markdown;

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
    clap_markdown::print_help_markdown::<Cli>();
}
