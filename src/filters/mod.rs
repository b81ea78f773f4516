use crate::fields::FieldRef;
use bson::{Bson, Document};
use std::fmt::Debug;
use thiserror::Error;

#[cfg(test)]
mod test;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("invalid filter field: {0}")]
    InvalidField(#[from] crate::fields::Error),
}

/// The boundary to the filter compiler. Implementations produce the match
/// document for the collection they are compiled against; the pipeline
/// submits the result verbatim and never inspects it.
pub trait FilterExpression: Debug + Send + Sync {
    fn compile(&self, collection: &str) -> Result<Document>;
}

/// Keyword-style equality filters: each pair compiles to an exact-match
/// condition on the resolved field path.
#[derive(PartialEq, Debug, Clone)]
pub struct EqualityFilter {
    pairs: Vec<(String, Bson)>,
}

impl EqualityFilter {
    pub fn new(pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<Bson>)>) -> Self {
        EqualityFilter {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl FilterExpression for EqualityFilter {
    fn compile(&self, _collection: &str) -> Result<Document> {
        let mut filter = Document::new();
        for (key, value) in &self.pairs {
            filter.insert(FieldRef::Path(key.clone()).checked_resolve()?, value.clone());
        }
        Ok(filter)
    }
}
