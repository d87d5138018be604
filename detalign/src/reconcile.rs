//! Builds one [FeatureRecord] per qualifying head noun of a parallel corpus.
//!
//! For every corpus row both sentences are parsed, and every noun of the corrected sentence whose
//! text also occurs in the learner sentence is looked up in the alignment. A record is emitted if
//! the noun has an aligned learner token, neither side is determined by a possessive or
//! demonstrative, and the noun has a syntactic role.

use std::{ops::AddAssign, sync::Arc};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    classify::Classification,
    corpus::CorpusRow,
    features::RelationSets,
    parse::Parse,
    types::*,
    utils::parallelism::MaybeParallelRefIterator,
    Error,
};

/// Options for the reconciliation of a corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    /// Process at most this many rows.
    pub max_rows: Option<usize>,
    /// Remove a leading quote token which parsers tend to split off from quoted sentences.
    pub strip_leading_quote: bool,
    pub quote: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            max_rows: None,
            strip_leading_quote: true,
            quote: "\"".into(),
        }
    }
}

/// Counters describing why candidates did or did not become records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub rows: usize,
    /// Rows skipped because parsing failed or the parses disagree with the alignment.
    pub failed_rows: usize,
    /// Nouns of the corrected sentence whose text occurs in the learner sentence.
    pub candidates: usize,
    pub unaligned: usize,
    pub excluded: usize,
    pub without_role: usize,
    pub records: usize,
}

impl AddAssign for ReconcileStats {
    fn add_assign(&mut self, other: Self) {
        self.rows += other.rows;
        self.failed_rows += other.failed_rows;
        self.candidates += other.candidates;
        self.unaligned += other.unaligned;
        self.excluded += other.excluded;
        self.without_role += other.without_role;
        self.records += other.records;
    }
}

/// The records of a corpus together with the learner sentences to run the token classifiers on.
/// `targets[i]` belongs to `records[i]`.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<FeatureRecord>,
    pub targets: Vec<TargetSentence>,
    pub stats: ReconcileStats,
}

#[derive(Debug, Default)]
struct RowOutput {
    records: Vec<FeatureRecord>,
    targets: Vec<TargetSentence>,
    stats: ReconcileStats,
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    relations: Arc<RelationSets>,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(relations: Arc<RelationSets>, options: ReconcileOptions) -> Self {
        Reconciler { relations, options }
    }

    pub fn relations(&self) -> &RelationSets {
        &self.relations
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    fn tokenize<P: Parse>(&self, parser: &P, text: &str) -> Result<Vec<Token>, Error> {
        let mut tokens = flatten(parser.parse(text)?);

        if self.options.strip_leading_quote
            && tokens
                .first()
                .map_or(false, |token| token.text == self.options.quote)
        {
            tokens.remove(0);
        }

        Ok(tokens)
    }

    fn reconcile_row<P: Parse>(&self, parser: &P, row: &CorpusRow) -> Result<RowOutput, Error> {
        let relations = &*self.relations;
        let source_tokens = self.tokenize(parser, row.source)?;
        let target_tokens = self.tokenize(parser, row.target)?;

        let mut output = RowOutput::default();

        for (i, word) in source_tokens.iter().enumerate() {
            if !relations.is_noun(word) || !row.target.contains(word.text.as_str()) {
                continue;
            }
            output.stats.candidates += 1;

            let excluded = relations.has_excluded_determiner(i, &source_tokens);

            let target_index = match row.alignment.aligned(i) {
                Some(pair) => pair.target_index(),
                None => {
                    debug!("'{}' at {} has no alignment.", word.text, i);
                    output.stats.unaligned += 1;
                    continue;
                }
            };
            if target_index >= target_tokens.len() {
                return Err(Error::IndexOutOfRange {
                    index: target_index,
                    len: target_tokens.len(),
                });
            }

            if excluded || relations.has_excluded_determiner(target_index, &target_tokens) {
                output.stats.excluded += 1;
                continue;
            }

            let role = match relations.syntactic_role(i, &source_tokens) {
                Some(role) => role,
                None => {
                    output.stats.without_role += 1;
                    continue;
                }
            };

            let article = relations.extract_article(i, &source_tokens);
            let classification = Classification::new(
                article,
                relations.extract_article(target_index, &target_tokens),
            );

            output.records.push(FeatureRecord {
                source: row.source.to_owned(),
                target: row.target.to_owned(),
                native_language: row.native_language.to_owned(),
                head_noun: word.text.clone(),
                obligatoriness: article.into(),
                article,
                error: Some(classification.error),
                error_type: Some(classification.error_type),
                coarse_error_type: Some(classification.coarse_error_type),
                number: relations.class_number(word),
                role,
                modification: relations.has_premodifier(target_index, &target_tokens),
                definiteness: None,
                referentiality: None,
                hawkins: None,
                abstractness: None,
            });
            output.targets.push(TargetSentence {
                tokens: target_tokens.iter().map(|x| x.text.clone()).collect(),
                position: target_index,
            });
            output.stats.records += 1;
        }

        Ok(output)
    }

    /// Reconciles the rows of a corpus, up to `max_rows`. A row which fails is logged and skipped.
    pub fn reconcile<P: Parse + Sync>(&self, parser: &P, rows: &[CorpusRow]) -> Extraction {
        let n = self.options.max_rows.map_or(rows.len(), |x| x.min(rows.len()));

        let outputs = rows[..n].maybe_par_map(|j, row| {
            let mut output = self.reconcile_row(parser, row).unwrap_or_else(|error| {
                warn!("Skipping row {}: {}", j + 1, error);
                RowOutput {
                    stats: ReconcileStats {
                        failed_rows: 1,
                        ..ReconcileStats::default()
                    },
                    ..RowOutput::default()
                }
            });
            output.stats.rows = 1;
            output
        });

        let mut extraction = Extraction::default();
        for output in outputs {
            extraction.records.extend(output.records);
            extraction.targets.extend(output.targets);
            extraction.stats += output.stats;
        }

        info!(
            "Emitted {} records from {} rows ({} failed). Of {} candidates, {} were unaligned, {} excluded and {} without role.",
            extraction.stats.records,
            extraction.stats.rows,
            extraction.stats.failed_rows,
            extraction.stats.candidates,
            extraction.stats.unaligned,
            extraction.stats.excluded,
            extraction.stats.without_role,
        );

        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alignment::SentenceAlignment,
        classify::{classify, ErrorTable},
        lang,
    };
    use std::collections::HashMap;

    /// A parser backed by a fixed table.
    struct FixedParser(HashMap<&'static str, Vec<Sentence>>);

    impl Parse for FixedParser {
        fn parse(&self, text: &str) -> Result<Vec<Sentence>, Error> {
            self.0
                .get(text)
                .cloned()
                .ok_or_else(|| Error::Unparsed(text.to_owned()))
        }
    }

    fn book(article: &'static str, possessive: bool) -> Vec<Sentence> {
        vec![Sentence::new(vec![
            Token::new(1, "I", "PRON", 2, "nsubj"),
            Token::new(2, "read", "VERB", 0, "root"),
            Token::new(3, article, if possessive { "PRON" } else { "DET" }, 4, "det"),
            Token::new(4, "book", "NOUN", 2, "obj"),
        ])]
    }

    fn parser() -> FixedParser {
        let mut map = HashMap::new();
        map.insert("I read the book", book("the", false));
        map.insert("I read a book", book("a", false));
        map.insert("I read my book", book("my", true));
        map.insert(
            "\"Books matter",
            vec![Sentence::new(vec![
                Token::new(1, "\"", "PUNCT", 3, "punct"),
                Token::new(2, "Books", "NOUN", 3, "nsubj").with_feats("Number=Plur"),
                Token::new(3, "matter", "VERB", 0, "root"),
            ])],
        );
        FixedParser(map)
    }

    fn identity() -> SentenceAlignment {
        SentenceAlignment::parse("NULL ({ }) I ({ 1 }) read ({ 2 }) x ({ 3 }) book ({ 4 })")
            .unwrap()
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(
            lang::relation_sets("en").unwrap(),
            ReconcileOptions::default(),
        )
    }

    fn row<'a>(
        source: &'a str,
        target: &'a str,
        alignment: &'a SentenceAlignment,
    ) -> CorpusRow<'a> {
        CorpusRow {
            source,
            target,
            native_language: "Japanese",
            alignment,
        }
    }

    #[test]
    fn emits_substitution() {
        let alignment = identity();
        let extraction = reconciler().reconcile(
            &parser(),
            &[row("I read the book", "I read a book", &alignment)],
        );

        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[0];
        assert_eq!(record.head_noun, "book");
        assert_eq!(record.article, Determiner::The);
        assert_eq!(record.obligatoriness, Obligatoriness::Obligatory);
        assert_eq!(record.error, Some("error"));
        assert_eq!(record.error_type, Some("sub_a_inst_the"));
        assert_eq!(record.coarse_error_type, Some("error_art"));
        assert_eq!(record.number, NumberClass::Singular);
        assert_eq!(record.role, SyntacticRole::Object);
        assert_eq!(record.modification, Modification::Unmodified);
        assert_eq!(record.native_language, "Japanese");

        assert_eq!(
            extraction.targets[0],
            TargetSentence {
                tokens: vec!["I".into(), "read".into(), "a".into(), "book".into()],
                position: 3,
            }
        );
    }

    #[test]
    fn records_match_table_lookup() {
        let alignment = identity();
        let parser = parser();
        let relations = lang::relation_sets("en").unwrap();

        for (source, target) in &[
            ("I read the book", "I read a book"),
            ("I read a book", "I read the book"),
            ("I read the book", "I read the book"),
        ] {
            let extraction =
                reconciler().reconcile(&parser, &[row(source, target, &alignment)]);
            let record = &extraction.records[0];

            let source_tokens = flatten(parser.parse(source).unwrap());
            let target_tokens = flatten(parser.parse(target).unwrap());
            let lookup = |table| {
                classify(
                    &relations,
                    3,
                    &source_tokens,
                    &target_tokens,
                    &alignment,
                    table,
                )
                .unwrap()
            };

            assert_eq!(record.error, lookup(ErrorTable::Binary));
            assert_eq!(record.error_type, lookup(ErrorTable::Fine));
            assert_eq!(record.coarse_error_type, lookup(ErrorTable::Coarse));
        }
    }

    #[test]
    fn possessive_is_never_emitted() {
        let alignment = identity();
        let parser = parser();

        for (source, target) in &[
            ("I read my book", "I read the book"),
            ("I read the book", "I read my book"),
        ] {
            let extraction =
                reconciler().reconcile(&parser, &[row(source, target, &alignment)]);
            assert!(extraction.records.is_empty());
            assert_eq!(extraction.stats.excluded, 1);
        }
    }

    #[test]
    fn unaligned_noun_is_counted() {
        let alignment = SentenceAlignment::parse("NULL ({ }) I ({ 1 })").unwrap();
        let extraction = reconciler().reconcile(
            &parser(),
            &[row("I read the book", "I read a book", &alignment)],
        );

        assert!(extraction.records.is_empty());
        assert_eq!(extraction.stats.candidates, 1);
        assert_eq!(extraction.stats.unaligned, 1);
    }

    #[test]
    fn failing_rows_are_skipped() {
        let alignment = identity();
        let bad_alignment =
            SentenceAlignment::parse("NULL ({ }) I ({ }) read ({ }) x ({ }) book ({ 7 })")
                .unwrap();
        let extraction = reconciler().reconcile(
            &parser(),
            &[
                row("not parsed", "I read a book", &alignment),
                row("I read the book", "I read a book", &bad_alignment),
                row("I read the book", "I read a book", &alignment),
            ],
        );

        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.stats.rows, 3);
        assert_eq!(extraction.stats.failed_rows, 2);
    }

    #[test]
    fn respects_row_limit() {
        let alignment = identity();
        let rows = vec![row("I read the book", "I read a book", &alignment); 5];

        let reconciler = Reconciler::new(
            lang::relation_sets("en").unwrap(),
            ReconcileOptions {
                max_rows: Some(2),
                ..ReconcileOptions::default()
            },
        );
        let extraction = reconciler.reconcile(&parser(), &rows);

        assert_eq!(extraction.stats.rows, 2);
        assert_eq!(extraction.records.len(), 2);
    }

    #[test]
    fn strips_leading_quote() {
        let reconciler = reconciler();
        let parser = parser();

        let tokens = reconciler.tokenize(&parser, "\"Books matter").unwrap();
        assert_eq!(tokens[0].text, "Books");

        // a sentence starting with a noun is untouched
        let tokens = reconciler.tokenize(&parser, "I read the book").unwrap();
        assert_eq!(tokens.len(), 4);

        let reconciler = Reconciler::new(
            lang::relation_sets("en").unwrap(),
            ReconcileOptions {
                strip_leading_quote: false,
                ..ReconcileOptions::default()
            },
        );
        let tokens = reconciler.tokenize(&parser, "\"Books matter").unwrap();
        assert_eq!(tokens[0].text, "\"");
    }

    #[test]
    fn zero_article_is_omission_context() {
        let alignment =
            SentenceAlignment::parse("NULL ({ }) Books ({ 1 }) matter ({ 2 })").unwrap();
        let extraction = reconciler().reconcile(
            &parser(),
            &[row("\"Books matter", "\"Books matter", &alignment)],
        );

        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[0];
        assert_eq!(record.article, Determiner::Zero);
        assert_eq!(record.obligatoriness, Obligatoriness::Omitted);
        assert_eq!(record.error_type, Some("correct_zero"));
        assert_eq!(record.number, NumberClass::Plural);
        assert_eq!(record.role, SyntacticRole::Subject);
    }
}
