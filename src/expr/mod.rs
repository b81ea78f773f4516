use crate::fields::FieldRef;
use bson::{bson, doc, Bson};
use thiserror::Error;

#[cfg(test)]
mod test;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown aggregation operator '{0}'")]
    UnknownOperator(String),
    #[error("invalid operand field: {0}")]
    InvalidOperandField(#[from] crate::fields::Error),
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum MqlOperator {
    // Boolean operators
    And,
    Not,
    Or,

    // Comparison operators
    Cmp,
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,

    // Arithmetic operators
    Abs,
    Add,
    Ceil,
    Divide,
    Floor,
    Log,
    Mod,
    Multiply,
    Pow,
    Round,
    Sqrt,
    Subtract,

    // String operators
    Concat,
    Split,
    StrLenCP,
    SubstrCP,
    ToLower,
    ToUpper,
    Trim,

    // Array operators
    ArrayElemAt,
    ConcatArrays,
    In,
    Size,
    Slice,

    // Set operators
    SetDifference,
    SetIntersection,
    SetUnion,

    // Conditional operators
    Cond,
    IfNull,

    // Date part operators
    DayOfMonth,
    DayOfWeek,
    DayOfYear,
    Hour,
    Minute,
    Month,
    Second,
    Week,
    Year,

    // Reducers usable in expression position
    Avg,
    Max,
    Min,
    Sum,

    // Type conversion operators
    ToDouble,
    ToInt,
    ToLong,
    ToString,
}

impl MqlOperator {
    /// parse maps a bare operator name, as accepted by [`Expression::call`],
    /// to its table entry. Names carry no dollar prefix.
    pub fn parse(name: &str) -> Option<MqlOperator> {
        use MqlOperator::*;
        Some(match name {
            "and" => And,
            "not" => Not,
            "or" => Or,
            "cmp" => Cmp,
            "eq" => Eq,
            "gt" => Gt,
            "gte" => Gte,
            "lt" => Lt,
            "lte" => Lte,
            "ne" => Ne,
            "abs" => Abs,
            "add" => Add,
            "ceil" => Ceil,
            "divide" => Divide,
            "floor" => Floor,
            "log" => Log,
            "mod" => Mod,
            "multiply" => Multiply,
            "pow" => Pow,
            "round" => Round,
            "sqrt" => Sqrt,
            "subtract" => Subtract,
            "concat" => Concat,
            "split" => Split,
            "strLenCP" => StrLenCP,
            "substrCP" => SubstrCP,
            "toLower" => ToLower,
            "toUpper" => ToUpper,
            "trim" => Trim,
            "arrayElemAt" => ArrayElemAt,
            "concatArrays" => ConcatArrays,
            "in" => In,
            "size" => Size,
            "slice" => Slice,
            "setDifference" => SetDifference,
            "setIntersection" => SetIntersection,
            "setUnion" => SetUnion,
            "cond" => Cond,
            "ifNull" => IfNull,
            "dayOfMonth" => DayOfMonth,
            "dayOfWeek" => DayOfWeek,
            "dayOfYear" => DayOfYear,
            "hour" => Hour,
            "minute" => Minute,
            "month" => Month,
            "second" => Second,
            "week" => Week,
            "year" => Year,
            "avg" => Avg,
            "max" => Max,
            "min" => Min,
            "sum" => Sum,
            "toDouble" => ToDouble,
            "toInt" => ToInt,
            "toLong" => ToLong,
            "toString" => ToString,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use MqlOperator::*;
        match self {
            And => "$and",
            Not => "$not",
            Or => "$or",
            Cmp => "$cmp",
            Eq => "$eq",
            Gt => "$gt",
            Gte => "$gte",
            Lt => "$lt",
            Lte => "$lte",
            Ne => "$ne",
            Abs => "$abs",
            Add => "$add",
            Ceil => "$ceil",
            Divide => "$divide",
            Floor => "$floor",
            Log => "$log",
            Mod => "$mod",
            Multiply => "$multiply",
            Pow => "$pow",
            Round => "$round",
            Sqrt => "$sqrt",
            Subtract => "$subtract",
            Concat => "$concat",
            Split => "$split",
            StrLenCP => "$strLenCP",
            SubstrCP => "$substrCP",
            ToLower => "$toLower",
            ToUpper => "$toUpper",
            Trim => "$trim",
            ArrayElemAt => "$arrayElemAt",
            ConcatArrays => "$concatArrays",
            In => "$in",
            Size => "$size",
            Slice => "$slice",
            SetDifference => "$setDifference",
            SetIntersection => "$setIntersection",
            SetUnion => "$setUnion",
            Cond => "$cond",
            IfNull => "$ifNull",
            DayOfMonth => "$dayOfMonth",
            DayOfWeek => "$dayOfWeek",
            DayOfYear => "$dayOfYear",
            Hour => "$hour",
            Minute => "$minute",
            Month => "$month",
            Second => "$second",
            Week => "$week",
            Year => "$year",
            Avg => "$avg",
            Max => "$max",
            Min => "$min",
            Sum => "$sum",
            ToDouble => "$toDouble",
            ToInt => "$toInt",
            ToLong => "$toLong",
            ToString => "$toString",
        }
    }
}

/// A compilable expression node, usable as a project value, a switch case,
/// or an operand of another expression.
#[derive(PartialEq, Debug, Clone)]
pub enum Expression {
    Operator(OperatorCall),
    Switch(Switch),
}

impl Expression {
    /// call builds an operator-call expression from a bare operator name,
    /// e.g. `Expression::call("size", [Operand::field("tags")])`. The name
    /// is validated against the operator table at compile time.
    pub fn call(op: impl Into<String>, args: impl IntoIterator<Item = Operand>) -> Self {
        Expression::Operator(OperatorCall {
            op: op.into(),
            args: args.into_iter().collect(),
        })
    }

    pub fn compile(&self) -> Result<Bson> {
        match self {
            Expression::Operator(call) => call.compile(),
            Expression::Switch(switch) => switch.compile(),
        }
    }
}

impl From<Switch> for Expression {
    fn from(switch: Switch) -> Self {
        Expression::Switch(switch)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct OperatorCall {
    pub op: String,
    pub args: Vec<Operand>,
}

impl OperatorCall {
    fn compile(&self) -> Result<Bson> {
        let operator = MqlOperator::parse(&self.op)
            .ok_or_else(|| Error::UnknownOperator(self.op.clone()))?
            .name();
        let mut args = self
            .args
            .iter()
            .map(Operand::compile)
            .collect::<Result<Vec<Bson>>>()?;
        // a single operand is passed as a bare scalar, never a one-element list
        let value = if args.len() == 1 {
            args.swap_remove(0)
        } else {
            Bson::Array(args)
        };
        Ok(bson!({ operator: value }))
    }
}

/// One argument of an operator call. Strings are literals; field references
/// must be wrapped explicitly, e.g. via [`Operand::field`].
#[derive(PartialEq, Debug, Clone)]
pub enum Operand {
    Field(FieldRef),
    Literal(Bson),
    Expr(Expression),
}

impl Operand {
    pub fn field(field: impl Into<FieldRef>) -> Self {
        Operand::Field(field.into())
    }

    fn compile(&self) -> Result<Bson> {
        match self {
            Operand::Field(field) => Ok(Bson::String(format!("${}", field.checked_resolve()?))),
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Expr(expr) => expr.compile(),
        }
    }
}

impl From<FieldRef> for Operand {
    fn from(field: FieldRef) -> Self {
        Operand::Field(field)
    }
}

impl From<crate::fields::FieldDescriptor> for Operand {
    fn from(descriptor: crate::fields::FieldDescriptor) -> Self {
        Operand::Field(descriptor.into())
    }
}

impl From<Expression> for Operand {
    fn from(expr: Expression) -> Self {
        Operand::Expr(expr)
    }
}

impl From<Switch> for Operand {
    fn from(switch: Switch) -> Self {
        Operand::Expr(switch.into())
    }
}

impl From<Bson> for Operand {
    fn from(value: Bson) -> Self {
        Operand::Literal(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Literal(Bson::String(value.to_string()))
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Literal(Bson::String(value))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Literal(Bson::Int32(value))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Literal(Bson::Int64(value))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Literal(Bson::Double(value))
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Literal(Bson::Boolean(value))
    }
}

/// A conditional expression compiled to `$switch`. Branches compile in the
/// order they were added; an unset default omits the key entirely, which is
/// not the same as a null default.
#[derive(PartialEq, Debug, Clone)]
pub struct Switch {
    pub branches: Vec<SwitchCase>,
    pub default: Option<Bson>,
}

impl Switch {
    pub fn new() -> Self {
        Switch {
            branches: Vec::new(),
            default: None,
        }
    }

    pub fn case(mut self, case: Expression, then: impl Into<CaseThen>) -> Self {
        self.branches.push(SwitchCase {
            case,
            then: then.into(),
        });
        self
    }

    pub fn default(mut self, default: impl Into<Bson>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn compile(&self) -> Result<Bson> {
        let branches = self
            .branches
            .iter()
            .map(|branch| {
                Ok(bson!({
                    "case": branch.case.compile()?,
                    "then": branch.then.compile()?,
                }))
            })
            .collect::<Result<Vec<Bson>>>()?;
        let mut switch_doc = doc! { "branches": branches };
        if let Some(default) = &self.default {
            switch_doc.insert("default", default.clone());
        }
        Ok(bson!({ "$switch": switch_doc }))
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct SwitchCase {
    pub case: Expression,
    pub then: CaseThen,
}

#[derive(PartialEq, Debug, Clone)]
pub enum CaseThen {
    Literal(Bson),
    Expr(Expression),
}

impl CaseThen {
    fn compile(&self) -> Result<Bson> {
        match self {
            CaseThen::Literal(value) => Ok(value.clone()),
            CaseThen::Expr(expr) => expr.compile(),
        }
    }
}

impl From<Expression> for CaseThen {
    fn from(expr: Expression) -> Self {
        CaseThen::Expr(expr)
    }
}

impl From<Switch> for CaseThen {
    fn from(switch: Switch) -> Self {
        CaseThen::Expr(switch.into())
    }
}

impl From<Bson> for CaseThen {
    fn from(value: Bson) -> Self {
        CaseThen::Literal(value)
    }
}

impl From<&str> for CaseThen {
    fn from(value: &str) -> Self {
        CaseThen::Literal(Bson::String(value.to_string()))
    }
}

impl From<String> for CaseThen {
    fn from(value: String) -> Self {
        CaseThen::Literal(Bson::String(value))
    }
}

impl From<i32> for CaseThen {
    fn from(value: i32) -> Self {
        CaseThen::Literal(Bson::Int32(value))
    }
}

impl From<i64> for CaseThen {
    fn from(value: i64) -> Self {
        CaseThen::Literal(Bson::Int64(value))
    }
}

impl From<f64> for CaseThen {
    fn from(value: f64) -> Self {
        CaseThen::Literal(Bson::Double(value))
    }
}

impl From<bool> for CaseThen {
    fn from(value: bool) -> Self {
        CaseThen::Literal(Bson::Boolean(value))
    }
}
