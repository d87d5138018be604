use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use detalign::{
    alignment::Alignments,
    corpus::ParallelCorpus,
    features::RelationSets,
    lang,
    parse::ConlluParser,
    table::{write_table, Targets},
    Artifact, Error, ReconcileOptions, Reconciler,
};
use fs_err::File;
use log::info;

/// Extracts one feature record per aligned head noun of a parallel corpus.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// Corrected sentences, one per line.
    #[arg(long)]
    correct: PathBuf,
    /// Learner sentences, one per line.
    #[arg(long)]
    orig: PathBuf,
    /// Native language of each item, one per line.
    #[arg(long)]
    native_language: PathBuf,
    /// Alignments written by `align`.
    #[arg(long)]
    alignments: PathBuf,
    /// Dependency parses of both sides in CoNLL-U format.
    #[arg(long)]
    conllu: Vec<PathBuf>,
    /// Language of the compiled-in relation sets.
    #[arg(long, default_value = "en")]
    lang: String,
    /// JSON file with relation sets, replaces the compiled-in ones.
    #[arg(long)]
    relations: Option<PathBuf>,
    #[arg(long)]
    max_rows: Option<usize>,
    /// Keep a leading quote token.
    #[arg(long)]
    keep_quotes: bool,
    /// Where to write the CSV table.
    #[arg(long)]
    out: PathBuf,
    /// Where to write the target sentences for the token classifiers.
    #[arg(long)]
    targets: PathBuf,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = Opts::parse();

    let relations = match &opts.relations {
        Some(path) => RelationSets::from_json(File::open(path)?)?,
        None => lang::relation_sets(&opts.lang).ok_or_else(|| {
            Error::InvalidOptions(format!(
                "no relation sets for '{}', available: {}",
                opts.lang,
                lang::lang_codes().join(", ")
            ))
        })?,
    };

    let corpus = ParallelCorpus::from_files(&opts.correct, &opts.orig, &opts.native_language)?;
    let alignments = Alignments::load(&opts.alignments)?;

    let mut parser = ConlluParser::default();
    for path in &opts.conllu {
        parser.extend(ConlluParser::new(path)?);
    }
    info!("Loaded parses of {} documents.", parser.len());

    let reconciler = Reconciler::new(
        relations,
        ReconcileOptions {
            max_rows: opts.max_rows,
            strip_leading_quote: !opts.keep_quotes,
            ..ReconcileOptions::default()
        },
    );
    let extraction = reconciler.reconcile(&parser, &corpus.rows(&alignments));

    let mut writer = BufWriter::new(File::create(&opts.out)?);
    write_table(&mut writer, &extraction.records)?;
    writer.flush()?;

    Targets::new(extraction.targets).save(&opts.targets)?;

    Ok(())
}
