use std::{collections::HashMap, io::BufRead, path::Path};

use fs_err::File;
use itertools::Itertools;
use log::info;

use super::Parse;
use crate::{
    types::{Sentence, Token},
    Error,
};

/// Normalizes whitespace so lookups do not depend on spacing.
fn key(text: &str) -> String {
    text.split_whitespace().join(" ")
}

#[derive(Default)]
struct SentenceState {
    text: Option<String>,
    tokens: Vec<Token>,
}

/// Replays dependency parses stored in CoNLL-U format.
///
/// Documents are delimited by `# newdoc` comments. If the file has none, every sentence is its own
/// document. A document is looked up by the text of its sentences (from the `# text =` comments,
/// or the token forms if a sentence has no such comment) joined by single spaces.
/// Multiword token ranges (`1-2`) and empty nodes (`1.1`) are skipped.
#[derive(Debug, Clone, Default)]
pub struct ConlluParser {
    documents: HashMap<String, Vec<Sentence>>,
}

impl ConlluParser {
    pub fn new<P: AsRef<Path>>(p: P) -> Result<Self, Error> {
        let reader = std::io::BufReader::new(File::open(p.as_ref())?);
        ConlluParser::from_reader(reader)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        // (document, text, sentence)
        let mut sentences: Vec<(usize, String, Sentence)> = Vec::new();
        let mut document = 0;
        let mut has_documents = false;
        let mut state = SentenceState::default();

        let mut finish = |state: &mut SentenceState, document: usize| {
            let SentenceState { text, tokens } = std::mem::take(state);
            if !tokens.is_empty() {
                let text =
                    text.unwrap_or_else(|| tokens.iter().map(|x| x.text.as_str()).join(" "));
                sentences.push((document, text, Sentence::new(tokens)));
            }
        };

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();

            if line.starts_with("# newdoc") {
                finish(&mut state, document);
                if has_documents {
                    document += 1;
                }
                has_documents = true;
            } else if let Some(text) = line.strip_prefix("# text =") {
                state.text = Some(text.trim().to_owned());
            } else if line.starts_with('#') {
                continue;
            } else if line.trim().is_empty() {
                finish(&mut state, document);
            } else if let Some(token) = parse_token(line, i + 1)? {
                state.tokens.push(token);
            }
        }
        finish(&mut state, document);

        let mut documents: HashMap<String, Vec<Sentence>> = HashMap::new();
        let n_sentences = sentences.len();

        if has_documents {
            for (_, group) in &sentences.into_iter().group_by(|x| x.0) {
                let (texts, group): (Vec<_>, Vec<_>) = group.map(|(_, t, s)| (t, s)).unzip();
                documents.entry(key(&texts.join(" "))).or_insert(group);
            }
        } else {
            for (_, text, sentence) in sentences {
                documents.entry(key(&text)).or_insert_with(|| vec![sentence]);
            }
        }

        info!(
            "Read {} sentences in {} documents from CoNLL-U.",
            n_sentences,
            documents.len()
        );
        Ok(ConlluParser { documents })
    }

    /// Adds the documents of another file. Documents already present are kept.
    pub fn extend(&mut self, other: ConlluParser) {
        for (text, sentences) in other.documents {
            self.documents.entry(text).or_insert(sentences);
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Parses one token line. Returns `None` for multiword ranges and empty nodes.
fn parse_token(line: &str, line_number: usize) -> Result<Option<Token>, Error> {
    let error = |message: String| Error::Conllu {
        line: line_number,
        message,
    };

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 8 {
        return Err(error(format!(
            "expected at least 8 tab-separated fields, found {}",
            fields.len()
        )));
    }

    let id = fields[0];
    if id.contains('-') || id.contains('.') {
        return Ok(None);
    }

    let id = id
        .parse()
        .map_err(|_| error(format!("invalid token id '{}'", id)))?;
    let head = fields[6]
        .parse()
        .map_err(|_| error(format!("invalid head '{}'", fields[6])))?;
    let feats = match fields[5] {
        "_" => "",
        feats => feats,
    };

    Ok(Some(
        Token::new(id, fields[1], fields[3], head, fields[7]).with_feats(feats),
    ))
}

impl Parse for ConlluParser {
    fn parse(&self, text: &str) -> Result<Vec<Sentence>, Error> {
        self.documents
            .get(&key(text))
            .cloned()
            .ok_or_else(|| Error::Unparsed(text.to_owned()))
    }
}
