/// Rowdex Query Building
///
/// A query is a conjunction of `(column, operator, operand)` criteria,
/// accumulated through [`QueryBuilder::and`]. Columns and operators are
/// validated as they are added; execution happens in `get_rows`, where the
/// planner picks the cheapest access path.

use crate::error::{Error, Result};
use crate::operand::{Range, ValueSet};
use crate::planner::QueryPlan;
use crate::row::Row;
use crate::table::Table;
use crate::value::Value;

/// Comparison operators of the query grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    Between,
    In,
}

impl Operator {
    /// Parse an operator token, case-insensitively.
    pub fn parse(s: &str) -> Result<Operator> {
        match s.to_lowercase().as_str() {
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">=" => Ok(Operator::Ge),
            ">" => Ok(Operator::Gt),
            "between" => Ok(Operator::Between),
            "in" => Ok(Operator::In),
            other => Err(Error::UnknownOperator(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::Between => "between",
            Operator::In => "in",
        }
    }
}

impl std::str::FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Operator> {
        Operator::parse(s)
    }
}

/// Right-hand side of a criterion: a scalar for the comparison operators,
/// a [`Range`] for `between`, a [`ValueSet`] for `in`.
#[derive(Debug, Clone)]
pub enum Operand {
    Scalar(Value),
    Range(Range),
    Set(ValueSet),
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Scalar(v)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Scalar(Value::Int(v))
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Scalar(Value::Int(v as i64))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Scalar(Value::Float(v))
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Scalar(Value::Bool(v))
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Scalar(Value::Str(v.to_string()))
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Scalar(Value::Str(v))
    }
}

impl From<Range> for Operand {
    fn from(r: Range) -> Self {
        Operand::Range(r)
    }
}

impl From<ValueSet> for Operand {
    fn from(s: ValueSet) -> Self {
        Operand::Set(s)
    }
}

/// One conjunctive predicate of a query.
#[derive(Debug, Clone)]
pub struct Criterion {
    pub column: String,
    pub op: Operator,
    pub operand: Operand,
}

impl Criterion {
    pub(crate) fn new(column: String, op: Operator, operand: Operand) -> Result<Criterion> {
        match (op, &operand) {
            (Operator::Between, Operand::Range(_)) => {}
            (Operator::Between, _) => {
                return Err(Error::InvalidOperand(format!(
                    "'between' on column '{}' requires a range operand",
                    column
                )));
            }
            (Operator::In, Operand::Set(_)) => {}
            (Operator::In, _) => {
                return Err(Error::InvalidOperand(format!(
                    "'in' on column '{}' requires a set operand",
                    column
                )));
            }
            (_, Operand::Scalar(_)) => {}
            (op, _) => {
                return Err(Error::InvalidOperand(format!(
                    "'{}' on column '{}' requires a scalar operand",
                    op.as_str(),
                    column
                )));
            }
        }
        Ok(Criterion { column, op, operand })
    }

    /// Cost of evaluating this criterion against a single row: one
    /// comparison as the base, a second one for `between`, one per extra
    /// element for `in`.
    pub(crate) fn single_row_cost(&self) -> f64 {
        match (&self.op, &self.operand) {
            (Operator::Between, _) => 2.0,
            (Operator::In, Operand::Set(set)) => set.len().max(1) as f64,
            _ => 1.0,
        }
    }

    /// Whether a row's cells satisfy this criterion, under the shared
    /// total order. Missing cells evaluate as `Null`.
    pub(crate) fn matches(&self, cells: &crate::value::Cells) -> bool {
        let cell = cells.get(&self.column).unwrap_or(&Value::Null);
        match (&self.op, &self.operand) {
            (Operator::Between, Operand::Range(range)) => range.includes(cell),
            (Operator::In, Operand::Set(set)) => set.includes(cell),
            (op, Operand::Scalar(v)) => {
                let ord = cell.total_cmp(v);
                match op {
                    Operator::Lt => ord.is_lt(),
                    Operator::Le => ord.is_le(),
                    Operator::Eq => ord.is_eq(),
                    Operator::Ne => ord.is_ne(),
                    Operator::Ge => ord.is_ge(),
                    Operator::Gt => ord.is_gt(),
                    Operator::Between | Operator::In => false,
                }
            }
            // Operand shape is validated at construction.
            _ => false,
        }
    }
}

/// Accumulates conjunctive criteria against one table.
///
/// Built by [`Table::find_where`]; extended with [`QueryBuilder::and`];
/// executed by [`QueryBuilder::get_rows`].
pub struct QueryBuilder<'a> {
    table: &'a Table,
    criteria: Vec<Criterion>,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(table: &'a Table, first: Criterion) -> Self {
        QueryBuilder {
            table,
            criteria: vec![first],
        }
    }

    /// Add another conjunctive criterion.
    pub fn and(
        mut self,
        column: &str,
        op: &str,
        operand: impl Into<Operand>,
    ) -> Result<Self> {
        let criterion = self.table.build_criterion(column, op, operand.into())?;
        self.criteria.push(criterion);
        Ok(self)
    }

    /// Plan and execute the query, returning cloned rows.
    pub fn get_rows(self) -> Result<Vec<Row>> {
        self.table.run_query(&self.criteria)
    }

    /// Plan the query without executing it.
    pub fn explain(&self) -> Result<QueryPlan> {
        self.table.plan_query(&self.criteria)
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }
}
