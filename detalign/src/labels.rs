//! Merges labels predicted by external classifiers into the feature records.
//!
//! Discourse labels come from token classification models which label every word of the learner
//! sentence a record was built from. The label at the head noun position is attached to the record.
//! Word classes come from classifiers which label the head noun alone.

use serde::{Deserialize, Serialize};

use crate::{
    artifact::Artifact,
    types::{Abstractness, Countability, FeatureRecord, NumberClass, TargetSentence},
    Error,
};

/// A token classification head and its label vocabulary. The class id of a label is its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelHead {
    /// Definiteness.
    #[serde(rename = "def")]
    Def,
    /// Referentiality.
    #[serde(rename = "ref")]
    Ref,
    /// Hawkins' categories of definite use.
    Hawkins,
}

const DEF: &[&str] = &["CLS/SEP/PAD", "-", "def", "indef"];
const REF: &[&str] = &["CLS/SEP/PAD", "-", "pred/prop", "ref", "nonref", "id_pred"];
const HAWKINS: &[&str] = &[
    "CLS/SEP/PAD",
    "-",
    "indef",
    "situational",
    "explanatory",
    "anaphoric",
    "kind",
];

impl LabelHead {
    pub fn all() -> &'static [LabelHead] {
        &[LabelHead::Def, LabelHead::Ref, LabelHead::Hawkins]
    }

    pub fn name(&self) -> &'static str {
        match self {
            LabelHead::Def => "def",
            LabelHead::Ref => "ref",
            LabelHead::Hawkins => "Hawkins",
        }
    }

    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            LabelHead::Def => DEF,
            LabelHead::Ref => REF,
            LabelHead::Hawkins => HAWKINS,
        }
    }

    /// Gets the label of a class id.
    pub fn label(&self, class_id: usize) -> Result<&'static str, Error> {
        self.vocabulary()
            .get(class_id)
            .copied()
            .ok_or_else(|| self.unknown(class_id.to_string()))
    }

    /// Maps a label to the static label of the vocabulary.
    pub fn check(&self, label: &str) -> Result<&'static str, Error> {
        self.vocabulary()
            .iter()
            .find(|x| **x == label)
            .copied()
            .ok_or_else(|| self.unknown(label.to_owned()))
    }

    fn unknown(&self, label: String) -> Error {
        Error::UnknownLabel {
            head: self.name().to_owned(),
            label,
        }
    }

    fn field<'a>(&self, record: &'a mut FeatureRecord) -> &'a mut Option<&'static str> {
        match self {
            LabelHead::Def => &mut record.definiteness,
            LabelHead::Ref => &mut record.referentiality,
            LabelHead::Hawkins => &mut record.hawkins,
        }
    }
}

/// Collapses subword predictions to one label per word.
///
/// `word_ids[i]` is the word the i-th subword belongs to, `None` for special tokens. Only the
/// first subword of each word is kept.
pub fn word_labels(
    head: LabelHead,
    class_ids: &[usize],
    word_ids: &[Option<usize>],
) -> Result<Vec<&'static str>, Error> {
    if class_ids.len() != word_ids.len() {
        return Err(Error::LengthMismatch {
            what: "subword word ids".into(),
            expected: class_ids.len(),
            found: word_ids.len(),
        });
    }

    let mut labels = Vec::new();
    let mut previous = None;

    for (class_id, word_id) in class_ids.iter().zip(word_ids) {
        if word_id.is_none() || *word_id == previous {
            continue;
        }
        labels.push(head.label(*class_id)?);
        previous = *word_id;
    }

    Ok(labels)
}

/// A token classification model: one label per input word.
pub trait Classify {
    fn head(&self) -> LabelHead;

    fn classify(&self, batch: &[Vec<String>]) -> Result<Vec<Vec<String>>, Error>;
}

impl<'a, T> Classify for &'a T
where
    T: Classify,
{
    fn head(&self) -> LabelHead {
        (*self).head()
    }

    fn classify(&self, batch: &[Vec<String>]) -> Result<Vec<Vec<String>>, Error> {
        (*self).classify(batch)
    }
}

/// Word-level predictions of one head for a batch of sentences, as written by the model scripts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predictions {
    sentences: Vec<Vec<String>>,
}

impl Artifact for Predictions {
    fn name() -> &'static str {
        "predictions"
    }
}

impl Predictions {
    pub fn new(sentences: Vec<Vec<String>>) -> Self {
        Predictions { sentences }
    }

    pub fn sentences(&self) -> &[Vec<String>] {
        &self.sentences
    }
}

/// Replays stored predictions as a [Classify] backend.
#[derive(Debug, Clone)]
pub struct PredictionFile {
    head: LabelHead,
    predictions: Predictions,
}

impl PredictionFile {
    pub fn new(head: LabelHead, predictions: Predictions) -> Self {
        PredictionFile { head, predictions }
    }
}

impl Classify for PredictionFile {
    fn head(&self) -> LabelHead {
        self.head
    }

    fn classify(&self, batch: &[Vec<String>]) -> Result<Vec<Vec<String>>, Error> {
        if batch.len() != self.predictions.sentences.len() {
            return Err(Error::LengthMismatch {
                what: format!("{} predictions", self.head.name()),
                expected: batch.len(),
                found: self.predictions.sentences.len(),
            });
        }

        Ok(self.predictions.sentences.clone())
    }
}

fn check_len(what: &str, expected: usize, found: usize) -> Result<(), Error> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            what: what.to_owned(),
            expected,
            found,
        })
    }
}

/// Attaches the label at each record's head noun position. `labels[i]` must label every token of
/// `targets[i]`.
pub fn merge_labels(
    records: &mut [FeatureRecord],
    targets: &[TargetSentence],
    head: LabelHead,
    labels: &[Vec<String>],
) -> Result<(), Error> {
    check_len("target sentences", records.len(), targets.len())?;
    check_len(
        &format!("{} label sequences", head.name()),
        records.len(),
        labels.len(),
    )?;

    for (i, (record, (target, labels))) in records
        .iter_mut()
        .zip(targets.iter().zip(labels))
        .enumerate()
    {
        check_len(
            &format!("{} labels of record {}", head.name(), i + 1),
            target.tokens.len(),
            labels.len(),
        )?;
        let label = labels.get(target.position).ok_or(Error::IndexOutOfRange {
            index: target.position,
            len: labels.len(),
        })?;

        *head.field(record) = Some(head.check(label)?);
    }

    Ok(())
}

/// Runs a classifier on the target sentences and merges its labels.
pub fn annotate<C: Classify>(
    records: &mut [FeatureRecord],
    targets: &[TargetSentence],
    classifier: C,
) -> Result<(), Error> {
    let batch: Vec<Vec<String>> = targets.iter().map(|x| x.tokens.clone()).collect();
    let labels = classifier.classify(&batch)?;

    merge_labels(records, targets, classifier.head(), &labels)
}

/// Merges head noun word classes, one label per record. A `mass` countability overrides the number
/// class, `count` leaves it as is.
pub fn merge_word_classes(
    records: &mut [FeatureRecord],
    abstractness: Option<&[String]>,
    countability: Option<&[String]>,
) -> Result<(), Error> {
    if let Some(labels) = abstractness {
        check_len("abstractness labels", records.len(), labels.len())?;

        for (record, label) in records.iter_mut().zip(labels) {
            record.abstractness = Some(Abstractness::from_label(label).ok_or_else(|| {
                Error::UnknownLabel {
                    head: "abstractness".into(),
                    label: label.clone(),
                }
            })?);
        }
    }

    if let Some(labels) = countability {
        check_len("countability labels", records.len(), labels.len())?;

        for (record, label) in records.iter_mut().zip(labels) {
            match Countability::from_label(label) {
                Some(Countability::Mass) => record.number = NumberClass::Mass,
                Some(Countability::Count) => {}
                None => {
                    return Err(Error::UnknownLabel {
                        head: "countability".into(),
                        label: label.clone(),
                    })
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn record() -> FeatureRecord {
        FeatureRecord {
            source: "I read the book".into(),
            target: "I read a book".into(),
            native_language: "Japanese".into(),
            head_noun: "book".into(),
            obligatoriness: Obligatoriness::Obligatory,
            article: Determiner::The,
            error: Some("error"),
            error_type: Some("sub_a_inst_the"),
            coarse_error_type: Some("error_art"),
            number: NumberClass::Singular,
            role: SyntacticRole::Object,
            modification: Modification::Unmodified,
            definiteness: None,
            referentiality: None,
            hawkins: None,
            abstractness: None,
        }
    }

    fn target() -> TargetSentence {
        TargetSentence {
            tokens: vec!["I".into(), "read".into(), "a".into(), "book".into()],
            position: 3,
        }
    }

    fn labels(x: &[&str]) -> Vec<String> {
        x.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn collapses_subwords() {
        // [CLS] i read a bo ##ok [SEP]
        let class_ids = [0, 1, 1, 1, 3, 2, 0];
        let word_ids = [None, Some(0), Some(1), Some(2), Some(3), Some(3), None];

        assert_eq!(
            word_labels(LabelHead::Def, &class_ids, &word_ids).unwrap(),
            vec!["-", "-", "-", "indef"]
        );
    }

    #[test]
    fn unknown_class_id_is_error() {
        assert!(matches!(
            word_labels(LabelHead::Def, &[4], &[Some(0)]),
            Err(Error::UnknownLabel { .. })
        ));
        assert_eq!(LabelHead::Hawkins.label(6).unwrap(), "kind");
    }

    #[test]
    fn merges_label_at_position() {
        let mut records = vec![record()];
        let predictions = vec![labels(&["-", "-", "-", "indef"])];

        merge_labels(&mut records, &[target()], LabelHead::Def, &predictions).unwrap();
        assert_eq!(records[0].definiteness, Some("indef"));
        assert_eq!(records[0].referentiality, None);
    }

    #[test]
    fn annotates_with_classifier() {
        let mut records = vec![record()];
        let classifier = PredictionFile::new(
            LabelHead::Hawkins,
            Predictions::new(vec![labels(&["-", "-", "-", "anaphoric"])]),
        );

        annotate(&mut records, &[target()], &classifier).unwrap();
        assert_eq!(records[0].hawkins, Some("anaphoric"));
    }

    #[test]
    fn mismatches_are_errors() {
        let mut records = vec![record()];

        // truncated label sequence
        let result = merge_labels(
            &mut records,
            &[target()],
            LabelHead::Ref,
            &[labels(&["-", "-", "ref"])],
        );
        assert!(matches!(result, Err(Error::LengthMismatch { .. })));

        // missing sentence
        let result = merge_labels(&mut records, &[target()], LabelHead::Ref, &[]);
        assert!(matches!(result, Err(Error::LengthMismatch { .. })));

        // label from another vocabulary
        let result = merge_labels(
            &mut records,
            &[target()],
            LabelHead::Ref,
            &[labels(&["-", "-", "-", "situational"])],
        );
        assert!(matches!(result, Err(Error::UnknownLabel { .. })));
        assert_eq!(records[0].referentiality, None);
    }

    #[test]
    fn merges_word_classes() {
        let mut records = vec![record(), record()];

        merge_word_classes(
            &mut records,
            Some(labels(&["abstr", "concr"]).as_slice()),
            Some(labels(&["count", "mass"]).as_slice()),
        )
        .unwrap();

        assert_eq!(records[0].abstractness, Some(Abstractness::Abstract));
        assert_eq!(records[0].number, NumberClass::Singular);
        assert_eq!(records[1].abstractness, Some(Abstractness::Concrete));
        assert_eq!(records[1].number, NumberClass::Mass);

        let abstractness = labels(&["abstr"]);
        assert!(merge_word_classes(&mut records, Some(abstractness.as_slice()), None).is_err());

        let countability = labels(&["x", "y"]);
        assert!(merge_word_classes(&mut records, None, Some(countability.as_slice())).is_err());
    }
}
