use crate::{accumulators, executor, expr, fields, filters, stages};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("field error: {0}")]
    Field(#[from] fields::Error),
    #[error("expression error: {0}")]
    Expression(#[from] expr::Error),
    #[error("accumulator error: {0}")]
    Accumulator(#[from] accumulators::Error),
    #[error("filter error: {0}")]
    Filter(#[from] filters::Error),
    #[error("stage compilation error: {0}")]
    Stage(#[from] stages::Error),
    #[error("execution error: {0}")]
    Executor(#[from] executor::Error),
}
