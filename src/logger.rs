/// Rowdex Operation Events
///
/// Tables emit a stream of operation events describing inserts, updates,
/// removes, planned queries and index lifecycle changes. The stream is
/// delivered to an injected [`Logger`], never to process-wide state; the
/// default sink forwards to the `log` facade at debug level. Emission is
/// gated by the table's `verbose` flag.

/// A single table operation, as reported to the logger.
#[derive(Debug, Clone)]
pub enum TableEvent {
    /// Rows were appended to the table and merged into its indexes.
    RowsInserted { table: String, count: usize },

    /// Rows were updated in place. `indexes_touched` counts the index
    /// remove/re-add cycles the changed columns forced.
    RowsUpdated {
        table: String,
        count: usize,
        columns_changed: Vec<String>,
        indexes_touched: usize,
    },

    /// Rows were removed from the table and all indexes.
    RowsRemoved { table: String, count: usize },

    /// The planner chose an access path for a query.
    QueryPlanned {
        table: String,
        criteria: usize,
        /// Signature of the chosen index, or `None` for a full scan.
        signature: Option<String>,
        cost: f64,
        rows_returned: usize,
    },

    IndexCreated { table: String, signature: String },

    IndexDropped { table: String, signature: String },

    TableDropped { table: String },
}

/// Sink for table operation events. Injected per table; implementations
/// must not assume a single global receiver.
pub trait Logger {
    fn log(&self, event: &TableEvent);
}

/// Default sink: forwards events to `log::debug!`.
#[derive(Debug, Default)]
pub struct LogSink;

impl Logger for LogSink {
    fn log(&self, event: &TableEvent) {
        match event {
            TableEvent::RowsInserted { table, count } => {
                log::debug!("table '{}': inserted {} rows", table, count);
            }
            TableEvent::RowsUpdated {
                table,
                count,
                columns_changed,
                indexes_touched,
            } => {
                log::debug!(
                    "table '{}': updated {} rows (columns {:?}, {} index rebuilds)",
                    table,
                    count,
                    columns_changed,
                    indexes_touched
                );
            }
            TableEvent::RowsRemoved { table, count } => {
                log::debug!("table '{}': removed {} rows", table, count);
            }
            TableEvent::QueryPlanned {
                table,
                criteria,
                signature,
                cost,
                rows_returned,
            } => {
                log::debug!(
                    "table '{}': query with {} criteria via {} (cost {:.2}) -> {} rows",
                    table,
                    criteria,
                    signature.as_deref().unwrap_or("full scan"),
                    cost,
                    rows_returned
                );
            }
            TableEvent::IndexCreated { table, signature } => {
                log::debug!("table '{}': created index {}", table, signature);
            }
            TableEvent::IndexDropped { table, signature } => {
                log::debug!("table '{}': dropped index {}", table, signature);
            }
            TableEvent::TableDropped { table } => {
                log::debug!("table '{}': dropped", table);
            }
        }
    }
}
