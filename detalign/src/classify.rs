//! Classification of an article choice by comparing the corrected sentence with the learner
//! sentence. The rows of each table are indexed by the article of the corrected sentence and the
//! columns by the article the learner used.

use serde::{Deserialize, Serialize};

use crate::{alignment::SentenceAlignment, features::RelationSets, types::*, Error};

type Table = [[&'static str; 3]; 3];

const BINARY: Table = [
    ["correct", "error", "error"],
    ["error", "correct", "error"],
    ["error", "error", "correct"],
];

const FINE: Table = [
    ["correct_a", "sub_the_inst_a", "omit_a"],
    ["sub_a_inst_the", "correct_the", "omit_the"],
    ["over_a", "over_the", "correct_zero"],
];

const COARSE: Table = [
    ["correct_art", "error_art", "omit"],
    ["error_art", "correct_art", "omit"],
    ["over", "over", "correct_om"],
];

/// The three label sets an article choice is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorTable {
    /// `correct` or `error`.
    Binary,
    /// Which article was substituted, omitted or inserted.
    Fine,
    /// Substitution, omission and over-insertion without the article.
    Coarse,
}

impl ErrorTable {
    fn table(&self) -> &'static Table {
        match self {
            ErrorTable::Binary => &BINARY,
            ErrorTable::Fine => &FINE,
            ErrorTable::Coarse => &COARSE,
        }
    }

    pub fn lookup(&self, source: Determiner, target: Determiner) -> &'static str {
        self.table()[source as usize][target as usize]
    }

    /// Maps a label back to the static label of this table.
    pub fn label(&self, label: &str) -> Result<&'static str, Error> {
        self.table()
            .iter()
            .flatten()
            .find(|x| **x == label)
            .copied()
            .ok_or_else(|| Error::UnknownLabel {
                head: format!("{:?}", self),
                label: label.to_owned(),
            })
    }
}

/// The labels of all three tables for one article pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub error: &'static str,
    pub error_type: &'static str,
    pub coarse_error_type: &'static str,
}

impl Classification {
    pub fn new(source: Determiner, target: Determiner) -> Self {
        Classification {
            error: ErrorTable::Binary.lookup(source, target),
            error_type: ErrorTable::Fine.lookup(source, target),
            coarse_error_type: ErrorTable::Coarse.lookup(source, target),
        }
    }
}

/// Classifies the article of the corrected token at `source_index` against the learner token it
/// is aligned to.
///
/// Returns `Ok(None)` if no link references the source token. A link pointing past the end of
/// `target_tokens` means the parses disagree with the alignment and is an error.
pub fn classify(
    relations: &RelationSets,
    source_index: usize,
    source_tokens: &[Token],
    target_tokens: &[Token],
    alignment: &SentenceAlignment,
    table: ErrorTable,
) -> Result<Option<&'static str>, Error> {
    let source = relations.extract_article(source_index, source_tokens);

    alignment
        .aligned(source_index)
        .map(|pair| {
            let target_index = pair.target_index();
            if target_index >= target_tokens.len() {
                return Err(Error::IndexOutOfRange {
                    index: target_index,
                    len: target_tokens.len(),
                });
            }

            let target = relations.extract_article(target_index, target_tokens);
            Ok(table.lookup(source, target))
        })
        .transpose()
}
