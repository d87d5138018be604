//! Fundamental types used by this crate.

use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};

use crate::Error;

/// One parsed word as produced by a dependency parser.
///
/// `id` is the 1-based position inside the sentence the parser produced it in and `head` is the id
/// of the governor (0 for the root). When several sentences are flattened into one token list the
/// ids are *not* renumbered, so `head` always refers to the parser-local numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: usize,
    pub text: String,
    pub upos: String,
    pub head: usize,
    pub deprel: String,
    /// `|`-separated morphological features, e.g. `Number=Plur|Person=3`. Empty if unset.
    #[serde(default)]
    pub feats: String,
}

impl Token {
    pub fn new<S: Into<String>>(id: usize, text: S, upos: S, head: usize, deprel: S) -> Self {
        Token {
            id,
            text: text.into(),
            upos: upos.into(),
            head,
            deprel: deprel.into(),
            feats: String::new(),
        }
    }

    pub fn with_feats<S: Into<String>>(mut self, feats: S) -> Self {
        self.feats = feats.into();
        self
    }

    /// Checks whether the token carries exactly this feature, e.g. `Number=Plur`.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.feats.split('|').any(|x| x == feature)
    }

    /// Checks whether this token is attached to `head` with the relation `deprel`.
    pub fn attaches_to(&self, head: &Token, deprel: &str) -> bool {
        self.head == head.id && self.deprel == deprel
    }
}

/// A sentence as returned by a parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Sentence { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Flattens the sentences of one parse into a single token list, keeping the parser-local ids.
pub fn flatten(sentences: Vec<Sentence>) -> Vec<Token> {
    sentences.into_iter().flat_map(Sentence::into_tokens).collect()
}

/// An article choice. `Zero` is the absence of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub enum Determiner {
    A = 0,
    The = 1,
    Zero = 2,
}

impl Determiner {
    pub fn all() -> &'static [Determiner] {
        &[Determiner::A, Determiner::The, Determiner::Zero]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Determiner::A => "a",
            Determiner::The => "the",
            Determiner::Zero => "zero",
        }
    }

    /// Maps the (already lowercased) text of an article token. `zero` is never a surface form.
    pub fn from_article(text: &str) -> Option<Self> {
        match text {
            "a" => Some(Determiner::A),
            "the" => Some(Determiner::The),
            _ => None,
        }
    }
}

impl fmt::Display for Determiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Determiner {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(Determiner::A),
            "the" => Ok(Determiner::The),
            "zero" => Ok(Determiner::Zero),
            _ => Err(Error::UnknownDeterminer(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Determiner {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Determiner> for String {
    fn from(determiner: Determiner) -> Self {
        determiner.as_str().to_owned()
    }
}

macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

label_enum!(
    /// Whether the context required an overt article (`obl`) or the zero article (`obl_om`).
    Obligatoriness {
        Obligatory => "obl",
        Omitted => "obl_om",
    }
);

impl From<Determiner> for Obligatoriness {
    fn from(determiner: Determiner) -> Self {
        match determiner {
            Determiner::Zero => Obligatoriness::Omitted,
            _ => Obligatoriness::Obligatory,
        }
    }
}

label_enum!(
    /// Grammatical number of a head noun. `Mass` is only ever set by a countability classifier.
    NumberClass {
        Singular => "sing",
        Plural => "plural",
        Mass => "mass",
    }
);

label_enum!(
    /// Syntactic role of a head noun in its clause.
    SyntacticRole {
        Subject => "sub",
        Object => "obj",
        Predicative => "pred/prop",
        Existential => "ex",
    }
);

label_enum!(
    /// Whether the head noun has a premodifier.
    Modification {
        Modified => "mod",
        Unmodified => "no_mod",
    }
);

label_enum!(
    /// Whether a head noun denotes something abstract, as predicted by a word classifier.
    Abstractness {
        Concrete => "concr",
        Abstract => "abstr",
    }
);

label_enum!(
    /// Whether a head noun is a count or a mass noun, as predicted by a word classifier.
    Countability {
        Mass => "mass",
        Count => "count",
    }
);

/// One row of the output table, describing the article choice for one head noun.
///
/// `source` is the corrected sentence the noun is taken from, `target` the learner sentence it is
/// aligned to. The discourse labels and word classes are unset until they are merged in by
/// [crate::labels].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub source: String,
    pub target: String,
    pub native_language: String,
    pub head_noun: String,
    pub obligatoriness: Obligatoriness,
    pub article: Determiner,
    pub error: Option<&'static str>,
    pub error_type: Option<&'static str>,
    pub coarse_error_type: Option<&'static str>,
    pub number: NumberClass,
    pub role: SyntacticRole,
    pub modification: Modification,
    pub definiteness: Option<&'static str>,
    pub referentiality: Option<&'static str>,
    pub hawkins: Option<&'static str>,
    pub abstractness: Option<Abstractness>,
}

/// The tokenized learner sentence and head noun position an emitted [FeatureRecord] was built from.
/// This is the input contract of the token classification model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSentence {
    pub tokens: Vec<String>,
    pub position: usize,
}
