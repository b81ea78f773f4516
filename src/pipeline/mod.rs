use crate::{
    filters::{EqualityFilter, FilterExpression},
    result::Result,
    stages::{GraphLookup, Group, GroupKey, Match, OrderBy, Project, Stage, Unwind},
};
use bson::{Bson, Document};

#[cfg(test)]
mod test;

/// An ordered aggregation pipeline over one collection.
///
/// Stages are appended through the builder methods and compiled in append
/// order by [`to_documents`](Pipeline::to_documents). A raw stage list set
/// via [`raw`](Pipeline::raw) takes unconditional precedence over appended
/// stages.
#[derive(Debug)]
pub struct Pipeline {
    collection: String,
    stages: Vec<Stage>,
    raw_override: Option<Vec<Document>>,
    grouped: bool,
}

impl Pipeline {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            stages: Vec::new(),
            raw_override: None,
            grouped: false,
        }
    }

    /// The collection this pipeline runs against.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Appends a group stage. Whether this is the pipeline's first group
    /// stage is captured here, at append time: the first one references
    /// input fields directly, every later one references the previous
    /// grouping's `_id` entries.
    pub fn group_by(mut self, keys: impl IntoIterator<Item = impl Into<GroupKey>>) -> Self {
        let first = !self.grouped;
        self.grouped = true;
        self.stages.push(Stage::Group(Group {
            keys: keys.into_iter().map(Into::into).collect(),
            first,
        }));
        self
    }

    /// Appends a match stage wrapping an arbitrary filter expression.
    pub fn match_filter(mut self, filter: impl FilterExpression + 'static) -> Self {
        self.stages.push(Stage::Match(Match {
            filter: Box::new(filter),
        }));
        self
    }

    /// Appends a match stage built from field/value equality pairs.
    pub fn match_eq(
        self,
        pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<Bson>)>,
    ) -> Self {
        self.match_filter(EqualityFilter::new(pairs))
    }

    pub fn unwind(mut self, field: impl Into<crate::fields::FieldRef>) -> Self {
        self.stages.push(Stage::Unwind(Unwind {
            field: field.into(),
        }));
        self
    }

    /// Appends a sort stage. A key prefixed with `-` sorts descending.
    pub fn order_by(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stages.push(Stage::OrderBy(OrderBy {
            keys: keys.into_iter().map(Into::into).collect(),
        }));
        self
    }

    pub fn project(mut self, project: Project) -> Self {
        self.stages.push(Stage::Project(project));
        self
    }

    pub fn graph_lookup(mut self, lookup: GraphLookup) -> Self {
        self.stages.push(Stage::GraphLookup(lookup));
        self
    }

    /// Replaces compilation output with a pre-built stage list. Once set,
    /// appended stages are ignored entirely.
    pub fn raw(mut self, stages: impl IntoIterator<Item = Document>) -> Self {
        self.raw_override = Some(stages.into_iter().collect());
        self
    }

    /// Compiles the pipeline into the ordered wire documents, or returns the
    /// raw stage list verbatim when one was supplied.
    pub fn to_documents(&self) -> Result<Vec<Document>> {
        if let Some(raw) = &self.raw_override {
            return Ok(raw.clone());
        }

        self.stages
            .iter()
            .map(|stage| Ok(stage.compile(&self.collection)?))
            .collect()
    }
}
