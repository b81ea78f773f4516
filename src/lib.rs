pub mod accumulators;
pub mod executor;
pub mod expr;
pub mod fields;
pub mod filters;
pub mod pipeline;
pub mod result;
pub mod stages;

pub use accumulators::Accumulator;
pub use executor::{client_options, AggregateTransport, ResultRecord};
pub use expr::{Expression, Operand, Switch};
pub use fields::{FieldDescriptor, FieldRef};
pub use filters::{EqualityFilter, FilterExpression};
pub use pipeline::Pipeline;
pub use result::{Error, Result};
pub use stages::{GraphLookup, GroupKey, Project, ASCENDING, DESCENDING};
