/// Rowdex Multi-Level Ordered Index
///
/// An index is parameterised by an ordered list of column names. Its root
/// is a sorted sequence of entries keyed by the first column's value; each
/// entry nests another sorted sequence keyed by the next column, down to
/// the leaf level, which holds the canonical rows sharing that key path.
///
/// Every entry tracks the count of rows under it (`size`) and the
/// inclusive prefix sum of sizes within its sequence (`subtotal`); each
/// sequence tracks the sum of its entries' sizes (`total`). These let the
/// planner turn one binary-search probe into a predicted result
/// cardinality without walking rows.
///
/// Mutations go through merge operations: the incoming rows are bulk-built
/// into a tree of the same shape, then merged into (or subtracted from)
/// the existing tree level by level, keeping sizes and subtotals
/// consistent without a rebuild.

use crate::error::{Error, Result};
use crate::planner::{self, QueryPlan};
use crate::query::Criterion;
use crate::row::RowSlot;
use crate::value::Value;
use serde::Serialize;
use std::cmp::Ordering;
use std::rc::Rc;

// ==================== Tree structure ====================

/// One sorted sequence of entries plus the sum of their sizes.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub entries: Vec<Entry>,
    pub total: usize,
}

/// One key value at some level of the tree.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub value: Value,
    /// Count of rows under this entry. Equals the leaf row-list length, or
    /// the nested sequence's total.
    pub size: usize,
    /// Inclusive prefix sum of sizes within the owning sequence.
    pub subtotal: usize,
    pub data: EntryData,
}

#[derive(Debug, Clone)]
pub(crate) enum EntryData {
    Nested(Node),
    Rows(Vec<RowSlot>),
}

impl Node {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Count of rows held by entries strictly before index `i`.
    pub fn prefix(&self, i: usize) -> usize {
        if i == 0 {
            0
        } else {
            self.entries[i - 1].subtotal
        }
    }

    /// Index of the first entry whose value is `>= v`.
    pub fn lower_bound(&self, v: &Value) -> usize {
        let probe = search(&self.entries, v);
        if probe.exact {
            probe.pos as usize
        } else {
            (probe.pos + 1) as usize
        }
    }

    /// Index of the first entry whose value is `> v`.
    pub fn upper_bound(&self, v: &Value) -> usize {
        let probe = search(&self.entries, v);
        (probe.pos + 1) as usize
    }

    /// Index of the entry exactly matching `v`, if present.
    pub fn exact(&self, v: &Value) -> Option<usize> {
        let probe = search(&self.entries, v);
        probe.exact.then(|| probe.pos as usize)
    }
}

// ==================== Binary search ====================

/// Result of probing a sorted entry sequence for a value.
///
/// With `exact` set, `pos` is the index of the matching entry. Otherwise
/// the value falls between indices `pos` and `pos + 1`: `pos` is the last
/// entry strictly below the value, or `-1` when the value sorts before
/// the whole sequence.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Probe {
    pub pos: isize,
    pub exact: bool,
}

/// Binary search over a strictly sorted entry sequence. Entries are
/// unique per sequence, so an equal hit is the only one.
pub(crate) fn search(entries: &[Entry], value: &Value) -> Probe {
    let mut lo: isize = -1;
    let mut hi: isize = entries.len() as isize;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        match entries[mid as usize].value.total_cmp(value) {
            Ordering::Less => lo = mid,
            Ordering::Equal => return Probe { pos: mid, exact: true },
            Ordering::Greater => hi = mid,
        }
    }
    Probe {
        pos: lo,
        exact: false,
    }
}

// ==================== Bulk build ====================

fn key_of(slot: &RowSlot, column: &str) -> Value {
    slot.borrow()
        .cells
        .get(column)
        .cloned()
        .unwrap_or(Value::Null)
}

/// Build a tree over `rows` keyed by `columns`, leaves last.
fn build_node(mut rows: Vec<RowSlot>, columns: &[String]) -> Node {
    let column = &columns[0];
    rows.sort_by(|a, b| {
        let ab = a.borrow();
        let bb = b.borrow();
        let av = ab.cells.get(column).unwrap_or(&Value::Null);
        let bv = bb.cells.get(column).unwrap_or(&Value::Null);
        av.total_cmp(bv)
    });

    let mut entries: Vec<Entry> = Vec::new();
    let mut subtotal = 0;
    let mut i = 0;
    while i < rows.len() {
        let value = key_of(&rows[i], column);
        let mut j = i + 1;
        while j < rows.len() && key_of(&rows[j], column) == value {
            j += 1;
        }
        let group: Vec<RowSlot> = rows[i..j].to_vec();
        let size = group.len();
        subtotal += size;
        let data = if columns.len() > 1 {
            EntryData::Nested(build_node(group, &columns[1..]))
        } else {
            EntryData::Rows(group)
        };
        entries.push(Entry {
            value,
            size,
            subtotal,
            data,
        });
        i = j;
    }

    Node {
        total: subtotal,
        entries,
    }
}

// ==================== Incremental merge ====================

/// Merge a freshly built right-hand tree into the existing left-hand one.
///
/// Two cursors walk each level in lockstep. Right-only keys are inserted
/// as near-clones; equal keys recurse (or concatenate row lists at the
/// leaf); left-only keys just have their prefix sums shifted by the
/// right-hand rows already merged in before them.
fn merge_add_node(left: &mut Node, right: Node, signature: &str) -> Result<()> {
    let mut li = 0usize;
    let mut carry = 0usize;
    let mut rights = right.entries.into_iter().peekable();

    while li < left.entries.len() {
        let order = match rights.peek() {
            Some(r) => left.entries[li].value.total_cmp(&r.value),
            None => break,
        };
        match order {
            Ordering::Less => {
                left.entries[li].subtotal += carry;
                li += 1;
            }
            Ordering::Greater => {
                let Some(r) = rights.next() else { break };
                let prev = if li == 0 {
                    0
                } else {
                    left.entries[li - 1].subtotal
                };
                carry += r.size;
                left.entries.insert(
                    li,
                    Entry {
                        value: r.value,
                        size: r.size,
                        subtotal: prev + r.size,
                        data: r.data,
                    },
                );
                li += 1;
            }
            Ordering::Equal => {
                let Some(r) = rights.next() else { break };
                match (&mut left.entries[li].data, r.data) {
                    (EntryData::Nested(ln), EntryData::Nested(rn)) => {
                        merge_add_node(ln, rn, signature)?;
                    }
                    (EntryData::Rows(lr), EntryData::Rows(rr)) => {
                        lr.extend(rr);
                    }
                    _ => {
                        return Err(Error::IndexCorruption(format!(
                            "{}: merge depth mismatch at value {}",
                            signature, r.value
                        )));
                    }
                }
                carry += r.size;
                left.entries[li].size += r.size;
                left.entries[li].subtotal += carry;
                li += 1;
            }
        }
    }

    // Left tail: shift prefix sums past everything merged in before it.
    while li < left.entries.len() {
        left.entries[li].subtotal += carry;
        li += 1;
    }

    // Right tail: all keys sort after the existing entries.
    for r in rights {
        let prev = left.entries.last().map_or(0, |e| e.subtotal);
        left.entries.push(Entry {
            value: r.value,
            size: r.size,
            subtotal: prev + r.size,
            data: r.data,
        });
    }

    left.total += right.total;
    left.entries
        .sort_by(|a, b| a.value.total_cmp(&b.value));
    Ok(())
}

/// Subtract a right-hand tree built from the rows being removed.
///
/// A right-hand key with no left-hand counterpart means the index never
/// held those rows, which is a corruption or a caller bug; it fails
/// loudly. Entries whose size drops to zero are deleted.
fn merge_remove_node(left: &mut Node, right: Node, signature: &str) -> Result<()> {
    let mut li = 0usize;
    let mut carry = 0usize;
    let mut rights = right.entries.into_iter().peekable();

    while li < left.entries.len() {
        let order = match rights.peek() {
            Some(r) => left.entries[li].value.total_cmp(&r.value),
            None => break,
        };
        match order {
            Ordering::Less => {
                left.entries[li].subtotal -= carry;
                li += 1;
            }
            Ordering::Greater => {
                let key = rights
                    .peek()
                    .map(|r| r.value.to_string())
                    .unwrap_or_default();
                return Err(Error::IndexCorruption(format!(
                    "{}: removal key {} not present",
                    signature, key
                )));
            }
            Ordering::Equal => {
                let Some(r) = rights.next() else { break };
                if r.size > left.entries[li].size {
                    return Err(Error::IndexCorruption(format!(
                        "{}: removing {} rows from entry {} holding {}",
                        signature, r.size, r.value, left.entries[li].size
                    )));
                }
                match (&mut left.entries[li].data, r.data) {
                    (EntryData::Nested(ln), EntryData::Nested(rn)) => {
                        merge_remove_node(ln, rn, signature)?;
                    }
                    (EntryData::Rows(lr), EntryData::Rows(rr)) => {
                        let mut removed = 0usize;
                        // Reverse walk keeps earlier positions stable while
                        // deleting in place.
                        for i in (0..lr.len()).rev() {
                            if rr.iter().any(|victim| Rc::ptr_eq(victim, &lr[i])) {
                                lr.remove(i);
                                removed += 1;
                            }
                        }
                        if removed != rr.len() {
                            return Err(Error::IndexCorruption(format!(
                                "{}: entry {} missing {} of {} rows marked for removal",
                                signature,
                                r.value,
                                rr.len() - removed,
                                rr.len()
                            )));
                        }
                    }
                    _ => {
                        return Err(Error::IndexCorruption(format!(
                            "{}: merge depth mismatch at value {}",
                            signature, r.value
                        )));
                    }
                }
                carry += r.size;
                left.entries[li].size -= r.size;
                left.entries[li].subtotal -= carry;
                if left.entries[li].size == 0 {
                    left.entries.remove(li);
                } else {
                    li += 1;
                }
            }
        }
    }

    if let Some(r) = rights.peek() {
        return Err(Error::IndexCorruption(format!(
            "{}: removal key {} not present",
            signature, r.value
        )));
    }

    while li < left.entries.len() {
        left.entries[li].subtotal -= carry;
        li += 1;
    }

    left.total -= right.total;
    Ok(())
}

/// Append every canonical row under `data` to `out`, depth first.
pub(crate) fn flatten_data(data: &EntryData, out: &mut Vec<RowSlot>) {
    match data {
        EntryData::Rows(rows) => out.extend(rows.iter().cloned()),
        EntryData::Nested(node) => {
            for entry in &node.entries {
                flatten_data(&entry.data, out);
            }
        }
    }
}

// ==================== Index ====================

/// One multi-level ordered index owned by a table.
///
/// Created through `Table::add_index`, which bulk-builds it from the rows
/// present at creation time; kept consistent afterwards by the table's
/// mutation path. Identified by its signature, the bracketed comma-joined
/// column list.
pub struct Index {
    columns: Vec<String>,
    signature: String,
    root: Option<Node>,
}

/// The signature under which an index with this column list is known.
pub(crate) fn signature_of(columns: &[String]) -> String {
    format!("[{}]", columns.join(","))
}

impl Index {
    pub(crate) fn build(columns: Vec<String>, rows: &[RowSlot]) -> Index {
        let signature = signature_of(&columns);
        let root = build_node(rows.to_vec(), &columns);
        Index {
            columns,
            signature,
            root: Some(root),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn is_dropped(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn root(&self) -> Result<&Node> {
        self.root
            .as_ref()
            .ok_or_else(|| Error::IndexDropped(self.signature.clone()))
    }

    fn root_mut(&mut self) -> Result<&mut Node> {
        self.root
            .as_mut()
            .ok_or_else(|| Error::IndexDropped(self.signature.clone()))
    }

    /// Ingest newly inserted rows.
    pub(crate) fn merge_add(&mut self, rows: &[RowSlot]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let right = build_node(rows.to_vec(), &self.columns);
        let signature = self.signature.clone();
        merge_add_node(self.root_mut()?, right, &signature)
    }

    /// Subtract rows that are being removed from the table.
    pub(crate) fn merge_remove(&mut self, rows: &[RowSlot]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let right = build_node(rows.to_vec(), &self.columns);
        let signature = self.signature.clone();
        merge_remove_node(self.root_mut()?, right, &signature)
    }

    /// Release the nested structure. Further operations fail with
    /// `IndexDropped`.
    pub(crate) fn clear(&mut self) {
        self.root = None;
    }

    /// Estimate the cost of answering `criteria` through this index.
    pub fn compute_cost(&self, criteria: &[Criterion]) -> Result<QueryPlan> {
        planner::cost_for_index(self, criteria)
    }

    /// Check the structural invariants of the whole tree. The error
    /// message names the offending path.
    pub fn validate(&self) -> Result<()> {
        let root = self.root()?;
        validate_node(root, &self.columns, &self.signature)
    }

    /// Every canonical row reachable from the leaves, depth first.
    pub(crate) fn collect_rows(&self) -> Result<Vec<RowSlot>> {
        let root = self.root()?;
        let mut out = Vec::with_capacity(root.total);
        for entry in &root.entries {
            flatten_data(&entry.data, &mut out);
        }
        Ok(out)
    }

    /// A read-only structural snapshot for renderers. Leaf row lists are
    /// reported as counts, never as row data.
    pub fn snapshot(&self) -> Result<IndexSnapshot> {
        let root = self.root()?;
        Ok(IndexSnapshot {
            signature: self.signature.clone(),
            columns: self.columns.clone(),
            total: root.total,
            entries: root.entries.iter().map(snapshot_entry).collect(),
        })
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("signature", &self.signature)
            .field("total", &self.root.as_ref().map(|r| r.total))
            .field("dropped", &self.root.is_none())
            .finish()
    }
}

fn validate_node(node: &Node, columns: &[String], path: &str) -> Result<()> {
    let mut prefix = 0usize;
    for (i, entry) in node.entries.iter().enumerate() {
        let here = format!("{}[{}]", path, i);
        if i > 0 {
            let prev = &node.entries[i - 1].value;
            if prev.total_cmp(&entry.value) != Ordering::Less {
                return Err(Error::IndexCorruption(format!(
                    "{}: entries out of order ({} before {})",
                    here, prev, entry.value
                )));
            }
        }
        if entry.size == 0 {
            return Err(Error::IndexCorruption(format!(
                "{}: empty entry for value {}",
                here, entry.value
            )));
        }
        match &entry.data {
            EntryData::Rows(rows) => {
                if columns.len() != 1 {
                    return Err(Error::IndexCorruption(format!(
                        "{}: leaf rows above the last level",
                        here
                    )));
                }
                if entry.size != rows.len() {
                    return Err(Error::IndexCorruption(format!(
                        "{}: size {} != {} leaf rows",
                        here,
                        entry.size,
                        rows.len()
                    )));
                }
            }
            EntryData::Nested(nested) => {
                if columns.len() < 2 {
                    return Err(Error::IndexCorruption(format!(
                        "{}: nested sequence at the leaf level",
                        here
                    )));
                }
                if entry.size != nested.total {
                    return Err(Error::IndexCorruption(format!(
                        "{}: size {} != nested total {}",
                        here, entry.size, nested.total
                    )));
                }
                validate_node(nested, &columns[1..], &here)?;
            }
        }
        prefix += entry.size;
        if entry.subtotal != prefix {
            return Err(Error::IndexCorruption(format!(
                "{}: subtotal {} != prefix sum {}",
                here, entry.subtotal, prefix
            )));
        }
    }
    if node.total != prefix {
        return Err(Error::IndexCorruption(format!(
            "{}: total {} != sum of sizes {}",
            path, node.total, prefix
        )));
    }
    Ok(())
}

// ==================== Snapshot ====================

/// Serializable view of an index tree, for external renderers.
#[derive(Debug, Clone, Serialize)]
pub struct IndexSnapshot {
    pub signature: String,
    pub columns: Vec<String>,
    pub total: usize,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEntry {
    pub value: Value,
    pub size: usize,
    pub subtotal: usize,
    /// Nested entries at the next level; absent at the leaf level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<SnapshotEntry>>,
}

fn snapshot_entry(entry: &Entry) -> SnapshotEntry {
    SnapshotEntry {
        value: entry.value.clone(),
        size: entry.size,
        subtotal: entry.subtotal,
        entries: match &entry.data {
            EntryData::Rows(_) => None,
            EntryData::Nested(node) => {
                Some(node.entries.iter().map(snapshot_entry).collect())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Stored;
    use crate::value::Cells;
    use std::cell::RefCell;

    fn slot(pairs: &[(&str, Value)], position: usize) -> RowSlot {
        let cells: Cells = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Rc::new(RefCell::new(Stored { cells, position }))
    }

    fn state(abbr: &str, region: &str, pop: i64, position: usize) -> RowSlot {
        slot(
            &[
                ("abbr", Value::from(abbr)),
                ("region", Value::from(region)),
                ("population", Value::Int(pop)),
            ],
            position,
        )
    }

    fn sample() -> Vec<RowSlot> {
        vec![
            state("CA", "West", 36_553_215, 0),
            state("TX", "Southwest", 23_904_380, 1),
            state("NY", "Northeast", 19_297_729, 2),
            state("OR", "West", 3_747_455, 3),
            state("WA", "West", 6_468_424, 4),
            state("ME", "Northeast", 1_317_207, 5),
        ]
    }

    #[test]
    fn test_bulk_build_shape() {
        let index = Index::build(
            vec!["region".to_string(), "population".to_string()],
            &sample(),
        );
        assert_eq!(index.signature(), "[region,population]");
        let root = index.root().unwrap();
        assert_eq!(root.total, 6);
        assert_eq!(root.len(), 3); // Northeast, Southwest, West

        let values: Vec<String> = root
            .entries
            .iter()
            .map(|e| e.value.to_string())
            .collect();
        assert_eq!(values, vec!["Northeast", "Southwest", "West"]);

        let west = &root.entries[2];
        assert_eq!(west.size, 3);
        assert_eq!(west.subtotal, 6);
        match &west.data {
            EntryData::Nested(node) => {
                assert_eq!(node.total, 3);
                // Populations sorted ascending within the region.
                let pops: Vec<i64> = node
                    .entries
                    .iter()
                    .map(|e| e.value.as_int().unwrap())
                    .collect();
                assert_eq!(pops, vec![3_747_455, 6_468_424, 36_553_215]);
            }
            EntryData::Rows(_) => panic!("expected a nested level"),
        }

        index.validate().unwrap();
    }

    #[test]
    fn test_search_probe() {
        let index = Index::build(vec!["population".to_string()], &sample());
        let root = index.root().unwrap();

        let hit = search(&root.entries, &Value::Int(6_468_424));
        assert!(hit.exact);
        assert_eq!(root.entries[hit.pos as usize].value, Value::Int(6_468_424));

        let miss = search(&root.entries, &Value::Int(2_000_000));
        assert!(!miss.exact);
        // Falls between ME (1.3M) and OR (3.7M).
        assert_eq!(root.entries[miss.pos as usize].value, Value::Int(1_317_207));

        let before_all = search(&root.entries, &Value::Int(0));
        assert!(!before_all.exact);
        assert_eq!(before_all.pos, -1);

        let after_all = search(&root.entries, &Value::Int(99_999_999));
        assert!(!after_all.exact);
        assert_eq!(after_all.pos as usize, root.len() - 1);
    }

    #[test]
    fn test_bounds() {
        let index = Index::build(vec!["population".to_string()], &sample());
        let root = index.root().unwrap();

        // Exact value present: lower bound lands on it, upper bound after it.
        assert_eq!(root.lower_bound(&Value::Int(3_747_455)), 1);
        assert_eq!(root.upper_bound(&Value::Int(3_747_455)), 2);
        // Absent value: both bounds agree on the insertion point.
        assert_eq!(root.lower_bound(&Value::Int(2_000_000)), 1);
        assert_eq!(root.upper_bound(&Value::Int(2_000_000)), 1);
    }

    #[test]
    fn test_merge_add_keeps_invariants() {
        let rows = sample();
        let mut index = Index::build(
            vec!["region".to_string(), "population".to_string()],
            &rows[..3],
        );
        index.merge_add(&rows[3..]).unwrap();
        index.validate().unwrap();

        let root = index.root().unwrap();
        assert_eq!(root.total, 6);
        assert_eq!(index.collect_rows().unwrap().len(), 6);

        // Matches a bulk build over the same rows.
        let bulk = Index::build(
            vec!["region".to_string(), "population".to_string()],
            &rows,
        );
        let bulk_root = bulk.root().unwrap();
        assert_eq!(root.len(), bulk_root.len());
        for (merged, built) in root.entries.iter().zip(bulk_root.entries.iter()) {
            assert_eq!(merged.value, built.value);
            assert_eq!(merged.size, built.size);
            assert_eq!(merged.subtotal, built.subtotal);
        }
    }

    #[test]
    fn test_merge_add_new_first_key() {
        let rows = sample();
        // Start without the Northeast rows so merged keys land in front.
        let mut index = Index::build(vec!["region".to_string()], &rows[..2]);
        index
            .merge_add(&[rows[2].clone(), rows[5].clone()])
            .unwrap();
        index.validate().unwrap();

        let root = index.root().unwrap();
        assert_eq!(root.entries[0].value, Value::from("Northeast"));
        assert_eq!(root.entries[0].size, 2);
        assert_eq!(root.entries[0].subtotal, 2);
        assert_eq!(root.entries[2].subtotal, root.total);
    }

    #[test]
    fn test_merge_remove() {
        let rows = sample();
        let mut index = Index::build(
            vec!["region".to_string(), "population".to_string()],
            &rows,
        );

        // Remove one West row; the region entry shrinks.
        index.merge_remove(&[rows[3].clone()]).unwrap();
        index.validate().unwrap();
        let root = index.root().unwrap();
        assert_eq!(root.total, 5);
        assert_eq!(root.entries[2].size, 2);

        // Remove the rest of West; the entry disappears.
        index
            .merge_remove(&[rows[0].clone(), rows[4].clone()])
            .unwrap();
        index.validate().unwrap();
        let root = index.root().unwrap();
        assert_eq!(root.len(), 2);
        assert!(root.entries.iter().all(|e| e.value != Value::from("West")));
    }

    #[test]
    fn test_merge_remove_unknown_key_fails() {
        let rows = sample();
        let mut index = Index::build(vec!["region".to_string()], &rows[..2]);
        let foreign = state("ZZ", "Atlantis", 1, 99);
        let err = index.merge_remove(&[foreign]).unwrap_err();
        assert!(matches!(err, Error::IndexCorruption(_)));
    }

    #[test]
    fn test_merge_remove_foreign_row_same_key_fails() {
        let rows = sample();
        let mut index = Index::build(vec!["region".to_string()], &rows);
        // Same key as existing rows, but a row the index never held.
        let foreign = state("ZZ", "West", 1, 99);
        let err = index.merge_remove(&[foreign]).unwrap_err();
        assert!(matches!(err, Error::IndexCorruption(_)));
    }

    #[test]
    fn test_validate_reports_corruption() {
        let mut index = Index::build(vec!["region".to_string()], &sample());
        if let Some(root) = index.root.as_mut() {
            root.entries[0].subtotal += 1;
        }
        let err = index.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("subtotal"), "unexpected: {}", message);
        assert!(message.contains("[region]"), "unexpected: {}", message);
    }

    #[test]
    fn test_dropped_index_errors() {
        let mut index = Index::build(vec!["region".to_string()], &sample());
        index.clear();
        assert!(index.is_dropped());
        assert!(matches!(index.validate(), Err(Error::IndexDropped(_))));
        assert!(matches!(
            index.merge_add(&sample()),
            Err(Error::IndexDropped(_))
        ));
    }

    #[test]
    fn test_snapshot_hides_rows() {
        let index = Index::build(
            vec!["region".to_string(), "population".to_string()],
            &sample(),
        );
        let snap = index.snapshot().unwrap();
        assert_eq!(snap.total, 6);
        let west = &snap.entries[2];
        assert_eq!(west.value, Value::from("West"));
        let nested = west.entries.as_ref().unwrap();
        // Leaf level reports sizes only.
        assert!(nested.iter().all(|e| e.entries.is_none()));

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"signature\":\"[region,population]\""));
    }
}
