use crate::{
    accumulators::Accumulator,
    expr::Expression,
    fields::{FieldDescriptor, FieldRef},
    filters::FilterExpression,
};
use bson::{doc, Bson, Document};
use lazy_static::lazy_static;
use thiserror::Error;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid stage field: {0}")]
    InvalidField(#[from] crate::fields::Error),
    #[error("invalid accumulator: {0}")]
    Accumulator(#[from] crate::accumulators::Error),
    #[error("invalid expression: {0}")]
    Expression(#[from] crate::expr::Error),
    #[error("invalid match filter: {0}")]
    Filter(#[from] crate::filters::Error),
}

lazy_static! {
    /// Wire values for sort directions.
    pub static ref ASCENDING: Bson = Bson::Int32(1);
    pub static ref DESCENDING: Bson = Bson::Int32(-1);
}

/// One aggregation pipeline step. Compilation produces a single-key stage
/// document; the key identifies the stage kind on the wire.
#[derive(Debug)]
pub enum Stage {
    Group(Group),
    GraphLookup(GraphLookup),
    Match(Match),
    OrderBy(OrderBy),
    Project(Project),
    Unwind(Unwind),
}

impl Stage {
    /// compile renders the stage against the pipeline's collection context.
    pub fn compile(&self, collection: &str) -> Result<Document> {
        match self {
            Stage::Group(group) => group.compile(),
            Stage::GraphLookup(lookup) => lookup.compile(),
            Stage::Match(matcher) => matcher.compile(collection),
            Stage::OrderBy(order_by) => order_by.compile(),
            Stage::Project(project) => project.compile(),
            Stage::Unwind(unwind) => unwind.compile(),
        }
    }
}

/// A group key either contributes to the composite `_id` or merges an
/// accumulator fragment beside it.
#[derive(Debug)]
pub enum GroupKey {
    Field(FieldRef),
    Accumulator(Accumulator),
}

impl From<FieldRef> for GroupKey {
    fn from(field: FieldRef) -> Self {
        GroupKey::Field(field)
    }
}

impl From<&str> for GroupKey {
    fn from(path: &str) -> Self {
        GroupKey::Field(path.into())
    }
}

impl From<String> for GroupKey {
    fn from(path: String) -> Self {
        GroupKey::Field(path.into())
    }
}

impl From<FieldDescriptor> for GroupKey {
    fn from(descriptor: FieldDescriptor) -> Self {
        GroupKey::Field(descriptor.into())
    }
}

impl From<Accumulator> for GroupKey {
    fn from(accumulator: Accumulator) -> Self {
        GroupKey::Accumulator(accumulator)
    }
}

#[derive(Debug)]
pub struct Group {
    pub keys: Vec<GroupKey>,
    /// Captured at append time: the first group stage references input
    /// fields directly, later ones reference the previous grouping's `_id`
    /// entries.
    pub first: bool,
}

impl Group {
    pub fn compile(&self) -> Result<Document> {
        let mut id_doc = Document::new();
        let mut accumulators = Document::new();
        for key in &self.keys {
            match key {
                GroupKey::Field(field) => {
                    let name = field.checked_resolve()?;
                    let reference = if self.first {
                        format!("${name}")
                    } else {
                        format!("$_id.{name}")
                    };
                    id_doc.insert(name, reference);
                }
                GroupKey::Accumulator(accumulator) => {
                    let (alias, fragment) = accumulator.compile()?;
                    accumulators.insert(alias, fragment);
                }
            }
        }
        let mut group_doc = doc! { "_id": id_doc };
        group_doc.extend(accumulators);
        Ok(doc! { "$group": group_doc })
    }
}

#[derive(Debug)]
pub struct Match {
    pub filter: Box<dyn FilterExpression>,
}

impl Match {
    pub fn compile(&self, collection: &str) -> Result<Document> {
        Ok(doc! { "$match": self.filter.compile(collection)? })
    }
}

#[derive(Debug)]
pub struct Unwind {
    pub field: FieldRef,
}

impl Unwind {
    pub fn compile(&self) -> Result<Document> {
        Ok(doc! { "$unwind": format!("${}", self.field.checked_resolve()?) })
    }
}

/// Sort keys prefixed with `-` sort descending. Key order is preserved on
/// the wire; it changes result semantics.
#[derive(Debug)]
pub struct OrderBy {
    pub keys: Vec<String>,
}

impl OrderBy {
    pub fn compile(&self) -> Result<Document> {
        let mut sort = Document::new();
        for key in &self.keys {
            let (name, direction) = match key.strip_prefix('-') {
                Some(name) => (name, DESCENDING.clone()),
                None => (key.as_str(), ASCENDING.clone()),
            };
            sort.insert(FieldRef::from(name).checked_resolve()?, direction);
        }
        Ok(doc! { "$sort": sort })
    }
}

/// A project value: a compiled expression, a remap of another field, or a
/// literal. Plain strings and field references are remaps; string literals
/// must be passed as [`Bson::String`].
#[derive(Debug)]
pub enum ProjectValue {
    Expr(Expression),
    Literal(Bson),
    Remap(FieldRef),
}

impl From<Expression> for ProjectValue {
    fn from(expr: Expression) -> Self {
        ProjectValue::Expr(expr)
    }
}

impl From<crate::expr::Switch> for ProjectValue {
    fn from(switch: crate::expr::Switch) -> Self {
        ProjectValue::Expr(switch.into())
    }
}

impl From<FieldRef> for ProjectValue {
    fn from(field: FieldRef) -> Self {
        ProjectValue::Remap(field)
    }
}

impl From<FieldDescriptor> for ProjectValue {
    fn from(descriptor: FieldDescriptor) -> Self {
        ProjectValue::Remap(descriptor.into())
    }
}

impl From<&str> for ProjectValue {
    fn from(path: &str) -> Self {
        ProjectValue::Remap(path.into())
    }
}

impl From<Bson> for ProjectValue {
    fn from(value: Bson) -> Self {
        ProjectValue::Literal(value)
    }
}

impl From<i32> for ProjectValue {
    fn from(value: i32) -> Self {
        ProjectValue::Literal(Bson::Int32(value))
    }
}

impl From<i64> for ProjectValue {
    fn from(value: i64) -> Self {
        ProjectValue::Literal(Bson::Int64(value))
    }
}

impl From<f64> for ProjectValue {
    fn from(value: f64) -> Self {
        ProjectValue::Literal(Bson::Double(value))
    }
}

impl From<bool> for ProjectValue {
    fn from(value: bool) -> Self {
        ProjectValue::Literal(Bson::Boolean(value))
    }
}

#[derive(Debug, Default)]
pub struct Project {
    pub included: Vec<FieldRef>,
    pub values: Vec<(String, ProjectValue)>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// include marks a field for inclusion with value `1`.
    pub fn include(mut self, field: impl Into<FieldRef>) -> Self {
        self.included.push(field.into());
        self
    }

    /// value adds a computed field. Names with logical path separators are
    /// translated to dotted storage paths.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<ProjectValue>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    pub fn compile(&self) -> Result<Document> {
        let mut project = Document::new();
        for field in &self.included {
            project.insert(field.checked_resolve()?, Bson::Int32(1));
        }
        for (name, value) in &self.values {
            let compiled = match value {
                ProjectValue::Expr(expr) => expr.compile()?,
                ProjectValue::Literal(literal) => literal.clone(),
                ProjectValue::Remap(field) => {
                    Bson::String(format!("${}", field.checked_resolve()?))
                }
            };
            project.insert(FieldRef::Path(name.clone()).checked_resolve()?, compiled);
        }
        Ok(doc! { "$project": project })
    }
}

/// Recursive traversal over a target collection, connecting
/// `connectFromField` values to `connectToField` matches starting from the
/// start expression.
#[derive(Debug)]
pub struct GraphLookup {
    pub from_collection: String,
    pub start_with: FieldRef,
    pub connect_from: FieldRef,
    pub connect_to: FieldRef,
    pub as_field: String,
    pub max_depth: Option<i64>,
    pub depth_field: Option<String>,
    pub restrict: Option<Box<dyn FilterExpression>>,
}

impl GraphLookup {
    pub fn new(
        from_collection: impl Into<String>,
        start_with: impl Into<FieldRef>,
        connect_from: impl Into<FieldRef>,
        connect_to: impl Into<FieldRef>,
        as_field: impl Into<String>,
    ) -> Self {
        GraphLookup {
            from_collection: from_collection.into(),
            start_with: start_with.into(),
            connect_from: connect_from.into(),
            connect_to: connect_to.into(),
            as_field: as_field.into(),
            max_depth: None,
            depth_field: None,
            restrict: None,
        }
    }

    pub fn max_depth(mut self, depth: i64) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn depth_field(mut self, field: impl Into<String>) -> Self {
        self.depth_field = Some(field.into());
        self
    }

    /// restrict narrows the traversal with a filter compiled against the
    /// target collection.
    pub fn restrict(mut self, filter: impl FilterExpression + 'static) -> Self {
        self.restrict = Some(Box::new(filter));
        self
    }

    pub fn compile(&self) -> Result<Document> {
        let mut lookup = doc! {
            "from": self.from_collection.clone(),
            "startWith": format!("${}", self.start_with.checked_resolve()?),
            "connectFromField": self.connect_from.checked_resolve()?,
            "connectToField": self.connect_to.checked_resolve()?,
            "as": self.as_field.clone(),
        };
        if let Some(max_depth) = self.max_depth {
            lookup.insert("maxDepth", max_depth);
        }
        if let Some(depth_field) = &self.depth_field {
            lookup.insert("depthField", depth_field.clone());
        }
        if let Some(restrict) = &self.restrict {
            lookup.insert(
                "restrictSearchWithMatch",
                restrict.compile(&self.from_collection)?,
            );
        }
        Ok(doc! { "$graphLookup": lookup })
    }
}
