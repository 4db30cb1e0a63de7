/// Rowdex - Multi-Indexed In-Memory Table Store
///
/// An in-memory tabular data store with multi-column ordered indexes and a
/// cost-based query planner. Tables hold homogeneous rows over a fixed
/// column list; conjunctive selection queries are answered through the
/// cheapest access path (a full scan or one of the indexes), with residual
/// predicates applied by filtering.

pub mod error;
pub mod executor;
pub mod index;
pub mod logger;
pub mod operand;
pub mod planner;
pub mod query;
pub mod row;
pub mod table;
pub mod value;

pub use error::{Error, Result};
pub use index::{Index, IndexSnapshot, SnapshotEntry};
pub use logger::{LogSink, Logger, TableEvent};
pub use operand::{Range, ValueSet};
pub use planner::QueryPlan;
pub use query::{Criterion, Operand, Operator, QueryBuilder};
pub use row::Row;
pub use table::Table;
pub use value::{compare, pluck, pluck_pair, Cells, Value};
