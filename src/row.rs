/// Rowdex Row Storage
///
/// A table owns one canonical storage instance per row. Callers never see
/// canonical rows directly; every row-returning operation hands out a
/// [`Row`] clone carrying an opaque back-reference to the canonical slot.
/// The clone may be mutated freely and only affects the table when passed
/// back to `update` or `remove`, where the back-reference identifies the
/// canonical row and verifies table identity.

use crate::value::{Cells, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Canonical row state owned by a table. The position tracks the row's
/// slot in the table's row vector and is rewritten on swap-remove.
#[derive(Debug)]
pub(crate) struct Stored {
    pub cells: Cells,
    pub position: usize,
}

/// Position of a slot whose canonical row has been removed.
pub(crate) const POSITION_REMOVED: usize = usize::MAX;

/// Shared handle on canonical row storage. Leaf index entries and the
/// table's row vector hold the same slots; identity is pointer identity.
pub(crate) type RowSlot = Rc<RefCell<Stored>>;

/// Opaque back-reference from a clone to its canonical row.
#[derive(Clone)]
pub(crate) struct RowHandle {
    pub table_id: u64,
    pub slot: RowSlot,
}

/// A row as handed to callers: an isolated copy of the canonical cells
/// plus the back-reference used by `update` and `remove`.
///
/// A detached row (built from plain cells, never inserted) has no
/// back-reference and can only be used as `insert` input.
#[derive(Clone)]
pub struct Row {
    cells: Cells,
    origin: Option<RowHandle>,
}

impl Row {
    /// Build a detached row from plain cells.
    pub fn new(cells: Cells) -> Self {
        Row { cells, origin: None }
    }

    /// Build a detached row from `(column, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Row::new(cells)
    }

    pub(crate) fn attached(cells: Cells, handle: RowHandle) -> Self {
        Row {
            cells,
            origin: Some(handle),
        }
    }

    pub(crate) fn origin(&self) -> Option<&RowHandle> {
        self.origin.as_ref()
    }

    /// The cell value for a column, if set on this clone.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Overwrite a cell on this clone. The table is unaffected until the
    /// clone is passed back to `update`.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    pub fn into_cells(self) -> Cells {
        self.cells
    }

    /// A fresh snapshot of the canonical state at call time. For a
    /// detached row this is a copy of the clone's own cells.
    pub fn snapshot(&self) -> Cells {
        match &self.origin {
            Some(handle) => handle.slot.borrow().cells.clone(),
            None => self.cells.clone(),
        }
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("cells", &self.cells)
            .field("attached", &self.origin.is_some())
            .finish()
    }
}

impl From<Cells> for Row {
    fn from(cells: Cells) -> Self {
        Row::new(cells)
    }
}
