/// Rowdex Table
///
/// A Table owns a fixed column list, the canonical row storage, and any
/// number of multi-column indexes. It coordinates every mutation: rows go
/// into the store first, then each index ingests the change through its
/// merge path. Queries flow through the planner, which picks the cheapest
/// access path, and the executor, which reduces and filters.
///
/// Rows handed out by a table are always clones; the canonical storage is
/// never exposed. A clone carries an opaque back-reference that `update`
/// and `remove` use to find the canonical row and to reject rows from
/// other tables.
///
/// # Examples
///
/// ```
/// use rowdex::{Row, Table, Value};
///
/// let mut table = Table::new("states", &["abbr", "region", "population"]).unwrap();
/// table
///     .insert(vec![
///         Row::from_pairs([
///             ("abbr", Value::from("CA")),
///             ("region", Value::from("West")),
///             ("population", Value::Int(36_553_215)),
///         ]),
///         Row::from_pairs([
///             ("abbr", Value::from("OR")),
///             ("region", Value::from("West")),
///             ("population", Value::Int(3_747_455)),
///         ]),
///     ])
///     .unwrap();
///
/// table.add_index(&["region", "population"]).unwrap();
///
/// let rows = table
///     .find_where("region", "==", "West")
///     .unwrap()
///     .and("population", ">", 10_000_000i64)
///     .unwrap()
///     .get_rows()
///     .unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].get("abbr").unwrap().as_str(), Some("CA"));
/// ```

use crate::error::{Error, Result};
use crate::executor;
use crate::index::{signature_of, Index};
use crate::logger::{LogSink, Logger, TableEvent};
use crate::planner::{self, QueryPlan};
use crate::query::{Criterion, Operand, Operator, QueryBuilder};
use crate::row::{Row, RowHandle, RowSlot, Stored, POSITION_REMOVED};
use crate::value::{Cells, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Identity tokens distinguishing rows of different tables.
static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Legal column names: an ASCII letter or underscore, then letters,
/// digits, underscores or dollar signs.
fn valid_column_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// In-memory table with multi-column indexes and cost-based querying.
pub struct Table {
    id: u64,
    name: String,
    columns: Vec<String>,
    rows: Vec<RowSlot>,
    indexes: Vec<Index>,
    verbose: bool,
    paranoia: bool,
    dropped: bool,
    logger: Box<dyn Logger>,
}

impl Table {
    /// Create a table over the given column list.
    ///
    /// Fails with `InvalidColumns` when the list is empty, has duplicates,
    /// or contains a syntactically illegal name.
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Result<Table> {
        let name = name.into();
        if columns.is_empty() {
            return Err(Error::InvalidColumns(format!(
                "table '{}' needs at least one column",
                name
            )));
        }
        let mut seen: Vec<&str> = Vec::with_capacity(columns.len());
        for column in columns {
            if !valid_column_name(column) {
                return Err(Error::InvalidColumns(format!(
                    "illegal column name '{}'",
                    column
                )));
            }
            if seen.contains(column) {
                return Err(Error::InvalidColumns(format!(
                    "duplicate column '{}'",
                    column
                )));
            }
            seen.push(column);
        }

        Ok(Table {
            id: NEXT_TABLE_ID.fetch_add(1, AtomicOrdering::Relaxed),
            name,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            indexes: Vec::new(),
            verbose: false,
            paranoia: false,
            dropped: false,
            logger: Box::new(LogSink),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows currently stored.
    pub fn get_count(&self) -> Result<usize> {
        self.ensure_live()?;
        Ok(self.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.get_count()? == 0)
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    // ==================== Mode flags and logging ====================

    /// Enable or disable operation-event emission to the logger.
    pub fn set_verbose(&mut self, on: bool) {
        self.verbose = on;
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Enable or disable automatic structural validation of every index
    /// after each mutation.
    pub fn set_paranoia(&mut self, on: bool) {
        self.paranoia = on;
    }

    pub fn paranoia(&self) -> bool {
        self.paranoia
    }

    /// Replace the injected event sink. The default forwards to the `log`
    /// facade at debug level.
    pub fn set_logger(&mut self, logger: Box<dyn Logger>) {
        self.logger = logger;
    }

    fn emit(&self, event: TableEvent) {
        if self.verbose {
            self.logger.log(&event);
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.dropped {
            Err(Error::TableDropped(self.name.clone()))
        } else {
            Ok(())
        }
    }

    // ==================== Mutations ====================

    /// Append rows, ingest them into every index, and return clones.
    ///
    /// Rows that already carry a table back-reference are skipped, so
    /// re-submitting previously returned clones is harmless.
    pub fn insert<I>(&mut self, rows: I) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = Row>,
    {
        self.ensure_live()?;

        // Validate every row before appending any.
        let mut incoming: Vec<Cells> = Vec::new();
        for row in rows {
            if row.origin().is_some() {
                continue;
            }
            incoming.push(self.canonical_cells(row.cells())?);
        }

        let mut slots: Vec<RowSlot> = Vec::new();
        for cells in incoming {
            let slot: RowSlot = Rc::new(RefCell::new(Stored {
                cells,
                position: self.rows.len(),
            }));
            self.rows.push(slot.clone());
            slots.push(slot);
        }

        if !slots.is_empty() {
            for index in &mut self.indexes {
                index.merge_add(&slots)?;
            }
        }
        self.check_paranoia()?;

        self.emit(TableEvent::RowsInserted {
            table: self.name.clone(),
            count: slots.len(),
        });
        Ok(slots.iter().map(|slot| self.clone_row(slot)).collect())
    }

    /// Apply a clone's cell values back onto its canonical row.
    ///
    /// The changed column set is computed against the canonical state;
    /// only indexes whose column list intersects it are touched, each via
    /// a merge-remove of the old row followed by a merge-add of the new
    /// one. A clone with unchanged values is a no-op.
    pub fn update(&mut self, rows: &[Row]) -> Result<()> {
        self.ensure_live()?;

        // Resolve and validate every row before touching any index.
        let mut work: Vec<(RowSlot, Cells, Vec<String>)> = Vec::new();
        for row in rows {
            let slot = self.resolve(row)?;
            let new_cells = self.canonical_cells(row.cells())?;
            let changed: Vec<String> = {
                let stored = slot.borrow();
                self.columns
                    .iter()
                    .filter(|column| {
                        let old = stored.cells.get(*column).unwrap_or(&Value::Null);
                        let new = new_cells.get(*column).unwrap_or(&Value::Null);
                        old != new
                    })
                    .cloned()
                    .collect()
            };
            work.push((slot, new_cells, changed));
        }

        let mut updated = 0usize;
        let mut indexes_touched = 0usize;
        let mut columns_changed: Vec<String> = Vec::new();

        for (slot, new_cells, changed) in work {
            if changed.is_empty() {
                continue;
            }

            let affected: Vec<usize> = self
                .indexes
                .iter()
                .enumerate()
                .filter(|(_, index)| index.columns().iter().any(|c| changed.contains(c)))
                .map(|(i, _)| i)
                .collect();

            for i in &affected {
                self.indexes[*i].merge_remove(std::slice::from_ref(&slot))?;
            }
            slot.borrow_mut().cells = new_cells;
            for i in &affected {
                self.indexes[*i].merge_add(std::slice::from_ref(&slot))?;
            }

            updated += 1;
            indexes_touched += affected.len();
            for column in changed {
                if !columns_changed.contains(&column) {
                    columns_changed.push(column);
                }
            }
        }

        self.check_paranoia()?;
        self.emit(TableEvent::RowsUpdated {
            table: self.name.clone(),
            count: updated,
            columns_changed,
            indexes_touched,
        });
        Ok(())
    }

    /// Remove the canonical rows behind the given clones from every index
    /// and from the row store.
    ///
    /// The store uses swap-remove: the last row takes the victim's slot
    /// and its stored position is rewritten.
    pub fn remove(&mut self, rows: &[Row]) -> Result<()> {
        self.ensure_live()?;

        let mut slots: Vec<RowSlot> = Vec::new();
        for row in rows {
            let slot = self.resolve(row)?;
            if !slots.iter().any(|s| Rc::ptr_eq(s, &slot)) {
                slots.push(slot);
            }
        }

        for index in &mut self.indexes {
            index.merge_remove(&slots)?;
        }

        for slot in &slots {
            let position = slot.borrow().position;
            self.rows.swap_remove(position);
            if position < self.rows.len() {
                self.rows[position].borrow_mut().position = position;
            }
            slot.borrow_mut().position = POSITION_REMOVED;
        }

        self.check_paranoia()?;
        self.emit(TableEvent::RowsRemoved {
            table: self.name.clone(),
            count: slots.len(),
        });
        Ok(())
    }

    /// Drop the table. Every index is cleared and all further operations
    /// fail with `TableDropped`.
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.emit(TableEvent::TableDropped {
            table: self.name.clone(),
        });
        for index in &mut self.indexes {
            index.clear();
        }
        self.indexes.clear();
        for slot in &self.rows {
            slot.borrow_mut().position = POSITION_REMOVED;
        }
        self.rows.clear();
        self.dropped = true;
        Ok(())
    }

    // ==================== Queries ====================

    /// Start a conjunctive query. Further criteria chain through
    /// [`QueryBuilder::and`].
    pub fn find_where(
        &self,
        column: &str,
        op: &str,
        operand: impl Into<Operand>,
    ) -> Result<QueryBuilder<'_>> {
        let criterion = self.build_criterion(column, op, operand.into())?;
        Ok(QueryBuilder::new(self, criterion))
    }

    /// Clones of every stored row.
    pub fn get_rows(&self) -> Result<Vec<Row>> {
        self.ensure_live()?;
        Ok(self.rows.iter().map(|slot| self.clone_row(slot)).collect())
    }

    pub(crate) fn build_criterion(
        &self,
        column: &str,
        op: &str,
        operand: Operand,
    ) -> Result<Criterion> {
        self.ensure_live()?;
        if !self.columns.iter().any(|c| c == column) {
            return Err(Error::InvalidColumns(format!(
                "unknown column '{}' on table '{}'",
                column, self.name
            )));
        }
        let op = Operator::parse(op)?;
        Criterion::new(column.to_string(), op, operand)
    }

    pub(crate) fn plan_query(&self, criteria: &[Criterion]) -> Result<QueryPlan> {
        self.ensure_live()?;
        planner::plan(self.rows.len(), &self.indexes, criteria)
    }

    pub(crate) fn run_query(&self, criteria: &[Criterion]) -> Result<Vec<Row>> {
        let plan = self.plan_query(criteria)?;
        let slots = executor::run(&self.rows, &self.indexes, &plan)?;
        let rows: Vec<Row> = slots.iter().map(|slot| self.clone_row(slot)).collect();
        self.emit(TableEvent::QueryPlanned {
            table: self.name.clone(),
            criteria: criteria.len(),
            signature: plan.signature.clone(),
            cost: plan.cost,
            rows_returned: rows.len(),
        });
        Ok(rows)
    }

    // ==================== Indexes ====================

    /// Create an index over the given column list, or return the existing
    /// one when an index with the same signature is already present. The
    /// index is bulk-built from the rows stored at creation time.
    pub fn add_index(&mut self, columns: &[&str]) -> Result<&Index> {
        self.ensure_live()?;
        let columns = self.index_columns(columns)?;
        let signature = signature_of(&columns);

        if let Some(pos) = self.indexes.iter().position(|i| i.signature() == signature) {
            return Ok(&self.indexes[pos]);
        }

        let index = Index::build(columns, &self.rows);
        if self.paranoia {
            index.validate()?;
        }
        self.emit(TableEvent::IndexCreated {
            table: self.name.clone(),
            signature,
        });
        self.indexes.push(index);
        let pos = self.indexes.len() - 1;
        Ok(&self.indexes[pos])
    }

    /// Look up an existing index by column list.
    pub fn index(&self, columns: &[&str]) -> Result<&Index> {
        self.ensure_live()?;
        let columns = self.index_columns(columns)?;
        let signature = signature_of(&columns);
        self.indexes
            .iter()
            .find(|i| i.signature() == signature)
            .ok_or_else(|| {
                Error::InvalidColumns(format!(
                    "no index {} on table '{}'",
                    signature, self.name
                ))
            })
    }

    /// The column lists of all current indexes.
    pub fn index_signatures(&self) -> Result<Vec<Vec<String>>> {
        self.ensure_live()?;
        Ok(self.indexes.iter().map(|i| i.columns().to_vec()).collect())
    }

    /// Drop the index over the given column list, clearing its structure.
    pub fn drop_index(&mut self, columns: &[&str]) -> Result<()> {
        self.ensure_live()?;
        let columns = self.index_columns(columns)?;
        let signature = signature_of(&columns);
        let pos = self
            .indexes
            .iter()
            .position(|i| i.signature() == signature)
            .ok_or_else(|| {
                Error::InvalidColumns(format!(
                    "no index {} on table '{}'",
                    signature, self.name
                ))
            })?;
        let mut index = self.indexes.remove(pos);
        index.clear();
        self.emit(TableEvent::IndexDropped {
            table: self.name.clone(),
            signature,
        });
        Ok(())
    }

    /// Check every index against its structural invariants and against
    /// the row store: each index must hold exactly the stored rows.
    pub fn validate_indexes(&self) -> Result<()> {
        self.ensure_live()?;
        for index in &self.indexes {
            index.validate()?;
            let leaves = index.collect_rows()?;
            if leaves.len() != self.rows.len() {
                return Err(Error::IndexCorruption(format!(
                    "{}: holds {} rows, table '{}' has {}",
                    index.signature(),
                    leaves.len(),
                    self.name,
                    self.rows.len()
                )));
            }
            for slot in &leaves {
                let position = slot.borrow().position;
                let matches = self
                    .rows
                    .get(position)
                    .map(|s| Rc::ptr_eq(s, slot))
                    .unwrap_or(false);
                if !matches {
                    return Err(Error::IndexCorruption(format!(
                        "{}: leaf row at position {} is not stored in table '{}'",
                        index.signature(),
                        position,
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_paranoia(&self) -> Result<()> {
        if self.paranoia {
            self.validate_indexes()?;
        }
        Ok(())
    }

    fn index_columns(&self, columns: &[&str]) -> Result<Vec<String>> {
        if columns.is_empty() {
            return Err(Error::InvalidColumns(
                "an index needs at least one column".to_string(),
            ));
        }
        let mut out: Vec<String> = Vec::with_capacity(columns.len());
        for column in columns {
            if !self.columns.iter().any(|c| c == column) {
                return Err(Error::InvalidColumns(format!(
                    "unknown column '{}' on table '{}'",
                    column, self.name
                )));
            }
            if out.iter().any(|c| c == column) {
                return Err(Error::InvalidColumns(format!(
                    "duplicate column '{}' in index",
                    column
                )));
            }
            out.push(column.to_string());
        }
        Ok(out)
    }

    // ==================== Rows ====================

    /// Normalise caller cells onto the table's column list: unknown
    /// columns are rejected, missing ones become `Null`.
    fn canonical_cells(&self, cells: &Cells) -> Result<Cells> {
        for key in cells.keys() {
            if !self.columns.iter().any(|c| c == key) {
                return Err(Error::InvalidColumns(format!(
                    "unknown column '{}' on table '{}'",
                    key, self.name
                )));
            }
        }
        Ok(self
            .columns
            .iter()
            .map(|column| {
                (
                    column.clone(),
                    cells.get(column).cloned().unwrap_or(Value::Null),
                )
            })
            .collect())
    }

    fn clone_row(&self, slot: &RowSlot) -> Row {
        Row::attached(
            slot.borrow().cells.clone(),
            RowHandle {
                table_id: self.id,
                slot: slot.clone(),
            },
        )
    }

    /// Resolve a caller's clone to the canonical row it was cloned from.
    fn resolve(&self, row: &Row) -> Result<RowSlot> {
        let origin = row.origin().ok_or_else(|| {
            Error::WrongTable(format!(
                "row has no back-reference and cannot target table '{}'",
                self.name
            ))
        })?;
        if origin.table_id != self.id {
            return Err(Error::WrongTable(format!(
                "row belongs to another table, not '{}'",
                self.name
            )));
        }
        let position = origin.slot.borrow().position;
        match self.rows.get(position) {
            Some(slot) if Rc::ptr_eq(slot, &origin.slot) => Ok(origin.slot.clone()),
            _ => Err(Error::WrongTable(format!(
                "row was already removed from table '{}'",
                self.name
            ))),
        }
    }

    // ==================== Export ====================

    /// Export all rows as a JSON array of objects, columns as keys.
    pub fn to_json(&self) -> Result<String> {
        self.ensure_live()?;
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|slot| {
                let stored = slot.borrow();
                let object: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .map(|column| {
                        let value = stored.cells.get(column).unwrap_or(&Value::Null);
                        (column.clone(), value_to_json(value))
                    })
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        Ok(serde_json::Value::Array(rows).to_string())
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::Number((*n).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("indexes", &self.indexes.len())
            .field("dropped", &self.dropped)
            .finish()
    }
}
