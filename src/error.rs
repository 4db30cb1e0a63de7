/// Rowdex Error Types
///
/// Every fallible operation in the crate returns [`Result`]. Failures are
/// immediate and fatal to the calling operation; there is no recovery path.

/// Errors raised by tables, indexes and queries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Column list is empty, contains duplicates or illegal names, or a
    /// query referenced a column the table does not have.
    #[error("invalid columns: {0}")]
    InvalidColumns(String),

    /// Operator string outside the supported grammar.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// Operator and operand do not fit together, e.g. `between` without a
    /// range operand.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    /// A row was submitted to `update` or `remove` whose back-reference
    /// belongs to another table, to no table, or to a row already removed.
    #[error("wrong table: {0}")]
    WrongTable(String),

    /// Operation attempted on a dropped table.
    #[error("table '{0}' has been dropped")]
    TableDropped(String),

    /// Operation attempted on a dropped index.
    #[error("index {0} has been dropped")]
    IndexDropped(String),

    /// A structural invariant of an index does not hold. The message names
    /// the offending path inside the tree.
    #[error("index corruption: {0}")]
    IndexCorruption(String),
}

pub type Result<T> = std::result::Result<T, Error>;
