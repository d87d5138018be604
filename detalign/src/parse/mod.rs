//! The boundary to the dependency parser. The pipeline only needs tokens with id, text,
//! part-of-speech, head, relation and features for a given text; any backend providing those can
//! be plugged in.

use crate::{types::Sentence, Error};

mod conllu;

pub use conllu::ConlluParser;

pub trait Parse {
    /// Parses a text into one or more sentences.
    fn parse(&self, text: &str) -> Result<Vec<Sentence>, Error>;
}

impl<'a, T> Parse for &'a T
where
    T: Parse,
{
    fn parse(&self, text: &str) -> Result<Vec<Sentence>, Error> {
        (*self).parse(text)
    }
}
