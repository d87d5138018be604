//! The parallel learner corpus: corrected sentences, the learner's original sentences and the
//! learner's native language, stored as three newline-aligned files.

use std::{
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use fs_err::File;
use log::{info, warn};

use crate::{
    alignment::{Alignments, SentenceAlignment},
    Error,
};

/// Native language used when the corpus does not record one.
pub const UNKNOWN_LANGUAGE: &str = "UNKNOWN";

/// One item of the corpus with its alignment.
#[derive(Debug, Clone, Copy)]
pub struct CorpusRow<'a> {
    /// The corrected sentence. Head nouns are taken from this side.
    pub source: &'a str,
    /// The learner's original sentence.
    pub target: &'a str,
    pub native_language: &'a str,
    pub alignment: &'a SentenceAlignment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelCorpus {
    correct: Vec<String>,
    orig: Vec<String>,
    native_languages: Vec<String>,
}

fn read_lines<P: AsRef<Path>>(p: P) -> Result<Vec<String>, Error> {
    let reader = BufReader::new(File::open(p.as_ref())?);
    reader
        .lines()
        .map(|line| Ok(line?.trim().to_owned()))
        .collect()
}

fn write_lines<P: AsRef<Path>>(p: P, lines: &[String]) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(p.as_ref())?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "xml")]
fn xml_child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children()
        .find(|x| x.is_element() && x.has_tag_name(name))
}

#[cfg(feature = "xml")]
fn xml_text(node: roxmltree::Node) -> String {
    node.text().unwrap_or("").trim().to_owned()
}

impl ParallelCorpus {
    pub fn new(
        correct: Vec<String>,
        orig: Vec<String>,
        native_languages: Vec<String>,
    ) -> Result<Self, Error> {
        for (what, found) in &[
            ("original sentences", orig.len()),
            ("native languages", native_languages.len()),
        ] {
            if *found != correct.len() {
                return Err(Error::LengthMismatch {
                    what: (*what).to_owned(),
                    expected: correct.len(),
                    found: *found,
                });
            }
        }

        Ok(ParallelCorpus {
            correct,
            orig,
            native_languages,
        })
    }

    /// Reads the three line files. Lines are trimmed.
    pub fn from_files<P: AsRef<Path>>(
        correct: P,
        orig: P,
        native_language: P,
    ) -> Result<Self, Error> {
        let corpus = ParallelCorpus::new(
            read_lines(correct)?,
            read_lines(orig)?,
            read_lines(native_language)?,
        )?;
        info!("Read parallel corpus with {} items.", corpus.len());
        Ok(corpus)
    }

    /// Writes the three line files.
    pub fn write_files<P: AsRef<Path>>(
        &self,
        correct: P,
        orig: P,
        native_language: P,
    ) -> Result<(), Error> {
        write_lines(correct, &self.correct)?;
        write_lines(orig, &self.orig)?;
        write_lines(native_language, &self.native_languages)
    }

    /// Reads the Lang-8 learner corpus XML. Each `essay` contributes its author's mother tongue and
    /// every `sentence` that has both a `correct` and an `orig` child.
    #[cfg(feature = "xml")]
    pub fn from_lang8_xml(text: &str) -> Result<Self, Error> {
        let document = roxmltree::Document::parse(text)?;
        let mut corpus = ParallelCorpus::default();

        for essay in document
            .root_element()
            .children()
            .filter(|x| x.has_tag_name("essay"))
        {
            let native_language = xml_child(essay, "author")
                .and_then(|author| xml_child(author, "mother_tongue"))
                .map(xml_text)
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_owned());

            for sentence in essay.children().filter(|x| x.has_tag_name("sentence")) {
                if let (Some(correct), Some(orig)) =
                    (xml_child(sentence, "correct"), xml_child(sentence, "orig"))
                {
                    corpus.correct.push(xml_text(correct));
                    corpus.orig.push(xml_text(orig));
                    corpus.native_languages.push(native_language.clone());
                }
            }
        }

        info!("Read {} sentence pairs from Lang-8 XML.", corpus.len());
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.correct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.correct.is_empty()
    }

    /// Pairs every item with its alignment. Items without an alignment are dropped.
    pub fn rows<'a>(&'a self, alignments: &'a Alignments) -> Vec<CorpusRow<'a>> {
        if alignments.len() != self.len() {
            warn!(
                "Corpus has {} items but there are alignments for {}.",
                self.len(),
                alignments.len()
            );
        }

        self.correct
            .iter()
            .zip(&self.orig)
            .zip(&self.native_languages)
            .zip(alignments.sentences())
            .map(|(((source, target), native_language), alignment)| CorpusRow {
                source: source.as_str(),
                target: target.as_str(),
                native_language: native_language.as_str(),
                alignment,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(x: &[&str]) -> Vec<String> {
        x.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn rejects_unaligned_files() {
        let result = ParallelCorpus::new(
            strings(&["a", "b"]),
            strings(&["a"]),
            strings(&["x", "y"]),
        );
        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn rows_stop_at_shortest() {
        let corpus = ParallelCorpus::new(
            strings(&["I read the book.", "Dogs bark."]),
            strings(&["I read a book.", "Dog bark."]),
            strings(&["Japanese", "Korean"]),
        )
        .unwrap();
        let alignments = Alignments::new(vec![SentenceAlignment::default()]);

        let rows = corpus.rows(&alignments);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, "I read the book.");
        assert_eq!(rows[0].target, "I read a book.");
        assert_eq!(rows[0].native_language, "Japanese");
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = |name: &str| dir.path().join(name);

        let corpus = ParallelCorpus::new(
            strings(&["I read the book."]),
            strings(&["I read a book."]),
            strings(&["Japanese"]),
        )
        .unwrap();
        corpus
            .write_files(path("correct.txt"), path("orig.txt"), path("nl.txt"))
            .unwrap();

        let read =
            ParallelCorpus::from_files(path("correct.txt"), path("orig.txt"), path("nl.txt"))
                .unwrap();
        assert_eq!(read, corpus);
    }

    #[cfg(feature = "xml")]
    #[test]
    fn reads_lang8_xml() {
        let xml = r#"<root>
  <essay>
    <author><mother_tongue> Japanese </mother_tongue></author>
    <sentence><orig>I have dog.</orig><correct>I have a dog.</correct></sentence>
    <sentence><orig>Only original.</orig></sentence>
  </essay>
  <essay>
    <sentence><orig>He is doctor.</orig><correct>He is a doctor.</correct></sentence>
  </essay>
</root>"#;
        let corpus = ParallelCorpus::from_lang8_xml(xml).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.correct, strings(&["I have a dog.", "He is a doctor."]));
        assert_eq!(corpus.orig, strings(&["I have dog.", "He is doctor."]));
        assert_eq!(corpus.native_languages, strings(&["Japanese", UNKNOWN_LANGUAGE]));
    }
}
