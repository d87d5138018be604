use std::{
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::Parser;
use detalign::{
    labels::{annotate, merge_word_classes, LabelHead, PredictionFile, Predictions},
    table::{read_table, write_table, Targets},
    Artifact, Error,
};
use fs_err::File;

/// Merges predicted discourse labels and head noun word classes into a feature table.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// Table written by `extract`.
    table: PathBuf,
    /// Target sentences written by `extract`.
    #[arg(long)]
    targets: PathBuf,
    /// Word-level predictions of the definiteness head.
    #[arg(long)]
    def: Option<PathBuf>,
    /// Word-level predictions of the referentiality head.
    #[arg(long = "ref")]
    referentiality: Option<PathBuf>,
    /// Word-level predictions of the Hawkins head.
    #[arg(long)]
    hawkins: Option<PathBuf>,
    /// One abstractness label per record.
    #[arg(long)]
    abstractness: Option<PathBuf>,
    /// One countability label per record.
    #[arg(long)]
    countability: Option<PathBuf>,
    #[arg(long, short)]
    out: PathBuf,
}

fn read_labels(path: &Path) -> Result<Vec<String>, Error> {
    BufReader::new(File::open(path)?)
        .lines()
        .map(|line| Ok(line?.trim().to_owned()))
        .filter(|line| !matches!(line, Ok(x) if x.is_empty()))
        .collect()
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = Opts::parse();

    let mut records = read_table(BufReader::new(File::open(&opts.table)?))?;
    let targets = Targets::load(&opts.targets)?;

    for (head, path) in LabelHead::all()
        .iter()
        .zip(&[&opts.def, &opts.referentiality, &opts.hawkins])
    {
        if let Some(path) = path {
            let predictions = PredictionFile::new(*head, Predictions::load(path)?);
            annotate(&mut records, targets.sentences(), predictions)?;
        }
    }

    let abstractness = opts.abstractness.as_deref().map(read_labels).transpose()?;
    let countability = opts.countability.as_deref().map(read_labels).transpose()?;
    merge_word_classes(
        &mut records,
        abstractness.as_deref(),
        countability.as_deref(),
    )?;

    let mut writer = BufWriter::new(File::create(&opts.out)?);
    write_table(&mut writer, &records)?;
    writer.flush()?;

    Ok(())
}
