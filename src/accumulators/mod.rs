use crate::fields::FieldRef;
use bson::{bson, Bson, Document};
use thiserror::Error;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("accumulator has no source fields")]
    NoSourceFields,
    #[error("invalid accumulator field: {0}")]
    InvalidField(#[from] crate::fields::Error),
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum AccumulatorFunction {
    Avg,
    First,
    Last,
    Push,
    Sum,
}

fn to_mql_op(function: AccumulatorFunction) -> &'static str {
    use AccumulatorFunction::*;
    match function {
        Avg => "$avg",
        First => "$first",
        Last => "$last",
        Push => "$push",
        Sum => "$sum",
    }
}

/// A group-scoped aggregation over one or more source fields, compiled into
/// a named fragment that a group stage merges beside its `_id`.
#[derive(PartialEq, Debug, Clone)]
pub struct Accumulator {
    pub function: AccumulatorFunction,
    pub fields: Vec<FieldRef>,
    pub alias: Option<String>,
}

impl Accumulator {
    fn single(function: AccumulatorFunction, field: impl Into<FieldRef>) -> Self {
        Accumulator {
            function,
            fields: vec![field.into()],
            alias: None,
        }
    }

    pub fn avg(field: impl Into<FieldRef>) -> Self {
        Self::single(AccumulatorFunction::Avg, field)
    }

    pub fn first(field: impl Into<FieldRef>) -> Self {
        Self::single(AccumulatorFunction::First, field)
    }

    pub fn last(field: impl Into<FieldRef>) -> Self {
        Self::single(AccumulatorFunction::Last, field)
    }

    pub fn sum(field: impl Into<FieldRef>) -> Self {
        Self::single(AccumulatorFunction::Sum, field)
    }

    /// push collects one document per grouped input, mapping each source
    /// field to a self-reference, e.g. `{"$push": {"x": "$x", "y": "$y"}}`.
    pub fn push(
        alias: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<FieldRef>>,
    ) -> Self {
        Accumulator {
            function: AccumulatorFunction::Push,
            fields: fields.into_iter().map(Into::into).collect(),
            alias: Some(alias.into()),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// compile produces the `(alias, fragment)` pair for a group stage. The
    /// alias defaults to the first source field's resolved name.
    pub fn compile(&self) -> Result<(String, Bson)> {
        let first = self.fields.first().ok_or(Error::NoSourceFields)?;
        let alias = match &self.alias {
            Some(alias) => alias.clone(),
            None => first.checked_resolve()?,
        };
        let operator = to_mql_op(self.function);
        let fragment = match self.function {
            AccumulatorFunction::Push => {
                let mut pushed = Document::new();
                for field in &self.fields {
                    let name = field.checked_resolve()?;
                    pushed.insert(name.clone(), format!("${name}"));
                }
                bson!({ operator: pushed })
            }
            _ => bson!({ operator: format!("${}", first.checked_resolve()?) }),
        };
        Ok((alias, fragment))
    }
}
