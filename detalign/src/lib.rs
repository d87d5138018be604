//! Extraction of article-choice features from a parallel learner corpus.
//! # Overview
//!
//! detalign pairs sentences written by language learners with their corrections and describes,
//! for every head noun the two share, which article the learner used and which one the correction
//! requires. The pipeline has three stages:
//! - [Alignments][alignment::Alignments] are read from word-aligner output and stored as JSON.
//! - A [Reconciler][reconcile::Reconciler] parses both sides of every [corpus][corpus::ParallelCorpus]
//!   row with a dependency [parser][parse::Parse] and emits one [FeatureRecord][types::FeatureRecord]
//!   per qualifying noun, with its error class from the [error tables][classify::ErrorTable].
//! - Discourse labels predicted by token classifiers and word classes are [merged][labels] into
//!   the records, which are written as a CSV [table][table::write_table].
//!
//! # Examples
//!
//! Classify an article substitution:
//!
//! ```
//! use detalign::classify::ErrorTable;
//! use detalign::types::Determiner;
//!
//! assert_eq!(ErrorTable::Fine.lookup(Determiner::The, Determiner::A), "sub_a_inst_the");
//! assert_eq!(ErrorTable::Coarse.lookup(Determiner::The, Determiner::The), "correct_art");
//! ```
//!
//! Read an alignment from aligner output:
//!
//! ```
//! use detalign::alignment::SentenceAlignment;
//!
//! let alignment = SentenceAlignment::parse("NULL ({ }) I ({ 1 }) read ({ 2 }) the ({ 3 }) book ({ 4 })")?;
//! assert_eq!(alignment.aligned(3).map(|x| x.target_index()), Some(3));
//! # Ok::<(), detalign::Error>(())
//! ```

use std::io;

use thiserror::Error;

pub mod alignment;
pub mod artifact;
pub mod classify;
pub mod corpus;
pub mod features;
pub mod labels;
pub mod lang;
pub mod parse;
pub mod reconcile;
pub mod table;
pub mod types;
pub(crate) mod utils;

pub use artifact::Artifact;
pub use reconcile::{ReconcileOptions, Reconciler};

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// (De)serialization error. Can have occured during deserialization or during serialization.
    #[error(transparent)]
    Serialization(#[from] bincode::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Regex(#[from] onig::Error),
    #[cfg(feature = "xml")]
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),
    #[error("malformed alignment: {0}")]
    MalformedAlignment(String),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("index {index} out of range for {len} tokens")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("unknown determiner \"{0}\"")]
    UnknownDeterminer(String),
    #[error("unknown {head} label \"{label}\"")]
    UnknownLabel { head: String, label: String },
    #[error("expected {expected} {what}, found {found}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    #[error("no parse for \"{0}\"")]
    Unparsed(String),
    #[error("CoNLL-U line {line}: {message}")]
    Conllu { line: usize, message: String },
}
