//! The files the pipeline hands between its stages: the CSV table of feature records and the target
//! sentences for the token classifiers.

use std::{
    convert::TryFrom,
    io::{Read, Write},
};

use serde::{Deserialize, Serialize};

use crate::{
    artifact::Artifact,
    classify::ErrorTable,
    labels::LabelHead,
    types::*,
    Error,
};

/// One row of the output table. Unset labels are empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub item_id: usize,
    #[serde(rename = "NL")]
    pub native_language: String,
    #[serde(rename = "L1")]
    pub source: String,
    #[serde(rename = "NP")]
    pub target: String,
    #[serde(rename = "Oblig")]
    pub obligatoriness: Obligatoriness,
    #[serde(rename = "Error")]
    pub error: Option<String>,
    #[serde(rename = "Target")]
    pub article: Determiner,
    #[serde(rename = "ErType")]
    pub error_type: Option<String>,
    #[serde(rename = "ErType2")]
    pub coarse_error_type: Option<String>,
    #[serde(rename = "def")]
    pub definiteness: Option<String>,
    #[serde(rename = "ref")]
    pub referentiality: Option<String>,
    #[serde(rename = "Hawkins")]
    pub hawkins: Option<String>,
    #[serde(rename = "HeadN")]
    pub head_noun: String,
    #[serde(rename = "Ntype")]
    pub number: NumberClass,
    #[serde(rename = "Abstract")]
    pub abstractness: Option<Abstractness>,
    #[serde(rename = "Rev_abstr")]
    pub revised_abstractness: Option<Abstractness>,
    #[serde(rename = "Synt")]
    pub role: SyntacticRole,
    #[serde(rename = "modif")]
    pub modification: Modification,
}

impl TableRow {
    /// Creates the row for a record. `item_id` is 1-based.
    pub fn new(item_id: usize, record: &FeatureRecord) -> Self {
        let owned = |x: Option<&'static str>| x.map(str::to_owned);

        TableRow {
            item_id,
            native_language: record.native_language.clone(),
            source: record.source.clone(),
            target: record.target.clone(),
            obligatoriness: record.obligatoriness,
            error: owned(record.error),
            article: record.article,
            error_type: owned(record.error_type),
            coarse_error_type: owned(record.coarse_error_type),
            definiteness: owned(record.definiteness),
            referentiality: owned(record.referentiality),
            hawkins: owned(record.hawkins),
            head_noun: record.head_noun.clone(),
            number: record.number,
            abstractness: record.abstractness,
            revised_abstractness: record.abstractness,
            role: record.role,
            modification: record.modification,
        }
    }
}

impl TryFrom<TableRow> for FeatureRecord {
    type Error = Error;

    /// Reads a row back, checking every label against its vocabulary.
    fn try_from(row: TableRow) -> Result<Self, Self::Error> {
        let table = |table: ErrorTable, x: Option<String>| x.map(|x| table.label(&x)).transpose();
        let head = |head: LabelHead, x: Option<String>| x.map(|x| head.check(&x)).transpose();

        Ok(FeatureRecord {
            source: row.source,
            target: row.target,
            native_language: row.native_language,
            head_noun: row.head_noun,
            obligatoriness: row.obligatoriness,
            article: row.article,
            error: table(ErrorTable::Binary, row.error)?,
            error_type: table(ErrorTable::Fine, row.error_type)?,
            coarse_error_type: table(ErrorTable::Coarse, row.coarse_error_type)?,
            number: row.number,
            role: row.role,
            modification: row.modification,
            definiteness: head(LabelHead::Def, row.definiteness)?,
            referentiality: head(LabelHead::Ref, row.referentiality)?,
            hawkins: head(LabelHead::Hawkins, row.hawkins)?,
            abstractness: row.abstractness,
        })
    }
}

/// Writes the records as CSV with a header row.
pub fn write_table<W: Write>(writer: W, records: &[FeatureRecord]) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for (i, record) in records.iter().enumerate() {
        writer.serialize(TableRow::new(i + 1, record))?;
    }
    writer.flush()?;

    Ok(())
}

/// Reads records from CSV written by [write_table].
pub fn read_table<R: Read>(reader: R) -> Result<Vec<FeatureRecord>, Error> {
    csv::Reader::from_reader(reader)
        .into_deserialize::<TableRow>()
        .map(|row| FeatureRecord::try_from(row?))
        .collect()
}

/// The learner sentences for the token classifiers, in record order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Targets {
    sentences: Vec<TargetSentence>,
}

impl Artifact for Targets {
    fn name() -> &'static str {
        "targets"
    }
}

impl Targets {
    pub fn new(sentences: Vec<TargetSentence>) -> Self {
        Targets { sentences }
    }

    pub fn sentences(&self) -> &[TargetSentence] {
        &self.sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FeatureRecord {
        FeatureRecord {
            source: "I read the book, \"twice\".".into(),
            target: "I read a book.".into(),
            native_language: "Japanese".into(),
            head_noun: "book".into(),
            obligatoriness: Obligatoriness::Obligatory,
            article: Determiner::The,
            error: Some("error"),
            error_type: Some("sub_a_inst_the"),
            coarse_error_type: Some("error_art"),
            number: NumberClass::Mass,
            role: SyntacticRole::Predicative,
            modification: Modification::Unmodified,
            definiteness: Some("indef"),
            referentiality: None,
            hawkins: None,
            abstractness: Some(Abstractness::Concrete),
        }
    }

    #[test]
    fn writes_header_and_cells() {
        let mut buffer = Vec::new();
        write_table(&mut buffer, &[record()]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "item_id,NL,L1,NP,Oblig,Error,Target,ErType,ErType2,def,ref,Hawkins,HeadN,Ntype,Abstract,Rev_abstr,Synt,modif"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,Japanese,\"I read the book, \"\"twice\"\".\",I read a book.,obl,error,the,sub_a_inst_the,error_art,indef,,,book,mass,concr,concr,pred/prop,no_mod"
        );
    }

    #[test]
    fn reads_back_what_it_writes() {
        let mut buffer = Vec::new();
        write_table(&mut buffer, &[record(), record()]).unwrap();

        assert_eq!(read_table(&buffer[..]).unwrap(), vec![record(), record()]);
    }

    #[test]
    fn rejects_unknown_labels() {
        let mut buffer = Vec::new();
        write_table(&mut buffer, &[record()]).unwrap();
        let text = String::from_utf8(buffer)
            .unwrap()
            .replace("sub_a_inst_the", "sub_x");

        assert!(matches!(
            read_table(text.as_bytes()),
            Err(Error::UnknownLabel { .. })
        ));
    }
}
