use std::path::PathBuf;

use clap::Parser;
use detalign::corpus::ParallelCorpus;

/// Splits the Lang-8 learner corpus XML into three newline-aligned files.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    xml: PathBuf,
    #[arg(long)]
    correct: PathBuf,
    #[arg(long)]
    orig: PathBuf,
    #[arg(long)]
    native_language: PathBuf,
}

fn main() -> Result<(), detalign::Error> {
    env_logger::init();
    let opts = Opts::parse();

    let text = fs_err::read_to_string(&opts.xml)?;
    let corpus = ParallelCorpus::from_lang8_xml(&text)?;
    corpus.write_files(&opts.correct, &opts.orig, &opts.native_language)?;

    Ok(())
}
