use std::{
    io::{BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use detalign::{
    alignment::{AlignmentOptions, Alignments},
    Artifact,
};
use fs_err::File;

/// Reads the alignment lines of a GIZA++ A3 file into an alignments artifact.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// The A3 file written by the aligner.
    giza: PathBuf,
    /// Where to write the alignments.
    #[arg(long, short)]
    out: PathBuf,
    /// Corpus file with one sentence per line. Only as many groups as it has lines are read.
    #[arg(long)]
    reference: Option<PathBuf>,
    #[arg(long, default_value_t = 3)]
    group_size: usize,
    /// 1-based position of the alignment line in each group.
    #[arg(long, default_value_t = 2)]
    alignment_line: usize,
    /// Write bincode instead of JSON.
    #[arg(long)]
    binary: bool,
}

fn main() -> Result<(), detalign::Error> {
    env_logger::init();
    let opts = Opts::parse();

    let max_sentences = match &opts.reference {
        Some(path) => Some(BufReader::new(File::open(path)?).lines().count()),
        None => None,
    };
    let options = AlignmentOptions {
        group_size: opts.group_size,
        alignment_line: opts.alignment_line,
        max_sentences,
    };

    let alignments = Alignments::from_giza(BufReader::new(File::open(&opts.giza)?), &options)?;

    if opts.binary {
        let mut writer = BufWriter::new(File::create(&opts.out)?);
        alignments.to_binary(&mut writer)?;
        writer.flush()?;
    } else {
        alignments.save(&opts.out)?;
    }

    Ok(())
}
