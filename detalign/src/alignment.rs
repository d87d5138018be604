//! Word alignments between a corrected sentence and the learner sentence it was derived from.
//!
//! Alignments are read from the `A3` output of GIZA++, which comes in groups of three lines per
//! sentence pair. Only one line of each group carries the alignment:
//! ```text
//! NULL ({ }) The ({ 1 }) cat ({ 2 3 }) sat ({ 4 })
//! ```
//! Every `WORD ({ ... })` unit is a word of the corrected sentence (unit 0 being the aligner's
//! `NULL` word), and the indices in braces are the 1-based positions of the learner sentence words
//! aligned to it.

use std::{convert::TryFrom, io::BufRead};

use lazy_static::lazy_static;
use log::{debug, info};
use onig::Regex;
use serde::{Deserialize, Serialize};

use crate::{artifact::Artifact, Error};

lazy_static! {
    static ref UNIT: Regex =
        Regex::new(r"(\S+)\s+\(\{\s*([^}]*)\s*\}\)").expect("alignment unit regex is valid");
}

/// Converts a 1-based alignment index to a 0-based token index. Index 0 addresses the `NULL` word
/// and has no token.
#[inline]
pub fn to_token_index(one_based: u32) -> Option<usize> {
    (one_based as usize).checked_sub(1)
}

/// One alignment link, serialized as `[target, source]`.
///
/// `target` is the 1-based position of a word in the learner sentence and is always at least 1.
/// `source` is the position of the unit in the corrected sentence, where 0 is the `NULL` word and
/// real words start at 1. Both are converted with [to_token_index] before indexing a token list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct AlignmentPair {
    target: u32,
    source: u32,
}

impl AlignmentPair {
    pub fn new(target: u32, source: u32) -> Result<Self, Error> {
        if target == 0 {
            return Err(Error::MalformedAlignment(format!(
                "target index must be 1-based, got [{}, {}]",
                target, source
            )));
        }
        Ok(AlignmentPair { target, source })
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn source(&self) -> u32 {
        self.source
    }

    /// The 0-based index of the aligned learner token.
    pub fn target_index(&self) -> usize {
        self.target as usize - 1
    }

    /// The 0-based index of the aligned corrected token, `None` for the `NULL` word.
    pub fn source_index(&self) -> Option<usize> {
        to_token_index(self.source)
    }
}

impl TryFrom<(u32, u32)> for AlignmentPair {
    type Error = Error;

    fn try_from((target, source): (u32, u32)) -> Result<Self, Self::Error> {
        AlignmentPair::new(target, source)
    }
}

impl From<AlignmentPair> for (u32, u32) {
    fn from(pair: AlignmentPair) -> Self {
        (pair.target, pair.source)
    }
}

/// The alignment of one sentence pair, sorted ascending by target index. The sort is stable so
/// links of the same learner word keep their order in the line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceAlignment {
    pairs: Vec<AlignmentPair>,
}

impl SentenceAlignment {
    pub fn new(mut pairs: Vec<AlignmentPair>) -> Self {
        pairs.sort_by_key(|pair| pair.target);
        SentenceAlignment { pairs }
    }

    /// Parses one alignment line. A line without any `WORD ({ ... })` unit yields an empty
    /// alignment, an index which is not a positive integer is an error.
    pub fn parse(line: &str) -> Result<Self, Error> {
        let mut pairs = Vec::new();

        for (position, captures) in UNIT.captures_iter(line).enumerate() {
            let indices = captures.at(2).unwrap_or("");

            for index in indices.split_whitespace() {
                let target: u32 = index.parse().map_err(|_| {
                    Error::MalformedAlignment(format!("invalid index '{}' in '{}'", index, line))
                })?;
                pairs.push(AlignmentPair::new(target, position as u32)?);
            }
        }

        Ok(SentenceAlignment::new(pairs))
    }

    pub fn pairs(&self) -> &[AlignmentPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Finds the first link (in sorted order) of the corrected token at the 0-based `source_index`.
    pub fn aligned(&self, source_index: usize) -> Option<&AlignmentPair> {
        self.pairs
            .iter()
            .find(|pair| pair.source_index() == Some(source_index))
    }
}

/// Options for reading an `A3` alignment file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentOptions {
    /// Number of physical lines per sentence pair.
    pub group_size: usize,
    /// 1-based position of the alignment line inside a group.
    pub alignment_line: usize,
    /// Stop after this many groups, usually the number of sentences in the corpus.
    pub max_sentences: Option<usize>,
}

impl Default for AlignmentOptions {
    fn default() -> Self {
        AlignmentOptions {
            group_size: 3,
            alignment_line: 2,
            max_sentences: None,
        }
    }
}

/// The alignments of a whole corpus, one entry per sentence pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alignments {
    sentences: Vec<SentenceAlignment>,
}

impl Artifact for Alignments {
    fn name() -> &'static str {
        "alignments"
    }
}

impl Alignments {
    pub fn new(sentences: Vec<SentenceAlignment>) -> Self {
        Alignments { sentences }
    }

    /// Reads alignments from an `A3` file, keeping only the alignment line of every group.
    pub fn from_giza<R: BufRead>(reader: R, options: &AlignmentOptions) -> Result<Self, Error> {
        if options.group_size == 0
            || options.alignment_line == 0
            || options.alignment_line > options.group_size
        {
            return Err(Error::InvalidOptions(format!(
                "alignment line {} is not inside a group of {}",
                options.alignment_line, options.group_size
            )));
        }

        let limit = options
            .max_sentences
            .map_or(usize::MAX, |n| n.saturating_mul(options.group_size));
        let mut sentences = Vec::new();

        for (i, line) in reader.lines().take(limit).enumerate() {
            let line = line?;

            if i % options.group_size + 1 == options.alignment_line {
                let alignment = SentenceAlignment::parse(&line)?;
                if alignment.is_empty() {
                    debug!("No alignment links in line {}.", i + 1);
                }
                sentences.push(alignment);
            }
        }

        info!("Read alignments for {} sentence pairs.", sentences.len());
        Ok(Alignments { sentences })
    }

    pub fn sentences(&self) -> &[SentenceAlignment] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}
