//! Features of a head noun read off a dependency parse.
//!
//! All functions take the flattened token list of one side and the 0-based index of the noun in
//! it. Relations are compared by the parser-local `id` / `head` numbering, never by list position.

use std::{io::Read, sync::Arc};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::types::{Determiner, Modification, NumberClass, SyntacticRole, Token};

/// The relation labels and word lists the features are computed from.
/// The defaults for a language live in `configs/<lang>/relations.json`, see [crate::lang].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelationSets {
    /// Part-of-speech tag of head noun candidates.
    pub noun_tag: String,
    pub determiner_relation: String,
    /// Surface forms counted as articles. Anything else governed by `det` is ignored.
    pub determiners: IndexSet<String>,
    /// Possessive and demonstrative determiners which rule a noun out.
    pub excluded_determiners: IndexSet<String>,
    /// Relations which rule a noun out when attached to it, e.g. `nmod:poss`.
    pub possessive_relations: IndexSet<String>,
    pub subject_relations: IndexSet<String>,
    pub object_relations: IndexSet<String>,
    pub apposition_relation: String,
    pub expletive_relation: String,
    pub premodifier_relations: IndexSet<String>,
    pub plural_feature: String,
}

impl Default for RelationSets {
    fn default() -> Self {
        RelationSets {
            noun_tag: "NOUN".into(),
            determiner_relation: "det".into(),
            determiners: IndexSet::new(),
            excluded_determiners: IndexSet::new(),
            possessive_relations: IndexSet::new(),
            subject_relations: IndexSet::new(),
            object_relations: IndexSet::new(),
            apposition_relation: "appos".into(),
            expletive_relation: "expl".into(),
            premodifier_relations: IndexSet::new(),
            plural_feature: "Number=Plur".into(),
        }
    }
}

impl RelationSets {
    /// Reads relation sets from JSON. Missing fields take their default.
    pub fn from_json<R: Read>(reader: R) -> Result<Arc<Self>, crate::Error> {
        Ok(Arc::new(serde_json::from_reader(reader)?))
    }

    pub fn is_noun(&self, token: &Token) -> bool {
        token.upos == self.noun_tag
    }

    /// Tokens attached to `noun` with the determiner relation.
    fn determiners_of<'a>(
        &'a self,
        noun: &'a Token,
        tokens: &'a [Token],
    ) -> impl Iterator<Item = &'a Token> + 'a {
        tokens
            .iter()
            .filter(move |w| w.attaches_to(noun, &self.determiner_relation))
    }

    /// The article governing the noun at `index`: the first token in sentence order attached
    /// with the determiner relation whose lowercased text is an article, [Determiner::Zero] if
    /// there is none.
    pub fn extract_article(&self, index: usize, tokens: &[Token]) -> Determiner {
        let noun = &tokens[index];

        self.determiners_of(noun, tokens)
            .map(|w| w.text.to_lowercase())
            .filter(|text| self.determiners.contains(text))
            .find_map(|text| Determiner::from_article(&text))
            .unwrap_or(Determiner::Zero)
    }

    pub fn class_number(&self, token: &Token) -> NumberClass {
        if token.has_feature(&self.plural_feature) {
            NumberClass::Plural
        } else {
            NumberClass::Singular
        }
    }

    /// The syntactic role of the token at `index`. Subject relations are checked before object
    /// relations, then apposition, then whether any other token with the same head is an expletive.
    pub fn syntactic_role(&self, index: usize, tokens: &[Token]) -> Option<SyntacticRole> {
        let token = &tokens[index];

        if self.subject_relations.contains(&token.deprel) {
            Some(SyntacticRole::Subject)
        } else if self.object_relations.contains(&token.deprel) {
            Some(SyntacticRole::Object)
        } else if token.deprel == self.apposition_relation {
            Some(SyntacticRole::Predicative)
        } else if tokens.iter().enumerate().any(|(i, w)| {
            i != index && w.head == token.head && w.deprel == self.expletive_relation
        }) {
            Some(SyntacticRole::Existential)
        } else {
            None
        }
    }

    /// Whether a premodifier relation attaches to the token at `index` from a token before it.
    pub fn has_premodifier(&self, index: usize, tokens: &[Token]) -> Modification {
        let noun = &tokens[index];

        if tokens.iter().any(|w| {
            w.head == noun.id && self.premodifier_relations.contains(&w.deprel) && w.id < noun.id
        }) {
            Modification::Modified
        } else {
            Modification::Unmodified
        }
    }

    /// Whether the noun at `index` is determined by a possessive or demonstrative, which takes it
    /// out of the article analysis.
    pub fn has_excluded_determiner(&self, index: usize, tokens: &[Token]) -> bool {
        let noun = &tokens[index];

        tokens.iter().any(|w| {
            (w.attaches_to(noun, &self.determiner_relation)
                && self.excluded_determiners.contains(&w.text.to_lowercase()))
                || (w.head == noun.id && self.possessive_relations.contains(&w.deprel))
        })
    }
}
