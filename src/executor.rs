/// Rowdex Query Execution
///
/// Executes the planner's chosen access path. An index path walks the
/// real tree with the same per-operator bounds the cost model used,
/// carrying a frontier of sequences level by level: each used criterion
/// selects entries out of every frontier sequence, and the last one's
/// selection is flattened into the candidate row list. Residual criteria
/// are applied as a linear filter over the candidates.

use crate::error::{Error, Result};
use crate::index::{flatten_data, Entry, EntryData, Index, Node};
use crate::planner::{between_bounds, comparison_bounds, QueryPlan};
use crate::query::{Criterion, Operand, Operator};
use crate::row::RowSlot;

/// Produce the matching canonical rows for an already planned query.
pub(crate) fn run(
    table_rows: &[RowSlot],
    indexes: &[Index],
    plan: &QueryPlan,
) -> Result<Vec<RowSlot>> {
    let candidates = match &plan.signature {
        None => table_rows.to_vec(),
        Some(signature) => {
            let index = indexes
                .iter()
                .find(|i| i.signature() == *signature)
                .ok_or_else(|| Error::IndexDropped(signature.clone()))?;
            reduce(index, &plan.used)?
        }
    };

    Ok(candidates
        .into_iter()
        .filter(|slot| {
            let stored = slot.borrow();
            plan.unused.iter().all(|c| c.matches(&stored.cells))
        })
        .collect())
}

/// Walk the index with the used criteria, reducing the frontier of
/// sequences until the last used column, then flatten what remains into
/// rows.
fn reduce(index: &Index, used: &[Criterion]) -> Result<Vec<RowSlot>> {
    if used.is_empty() {
        return index.collect_rows();
    }

    let mut frontier: Vec<&Node> = vec![index.root()?];
    for (i, criterion) in used.iter().enumerate() {
        let mut selected: Vec<&Entry> = Vec::new();
        for node in frontier.iter().copied() {
            select_entries(node, criterion, &mut selected);
        }

        if i + 1 == used.len() {
            let mut out = Vec::new();
            for entry in selected {
                flatten_data(&entry.data, &mut out);
            }
            return Ok(out);
        }

        let mut next: Vec<&Node> = Vec::with_capacity(selected.len());
        for entry in selected {
            match &entry.data {
                EntryData::Nested(node) => next.push(node),
                EntryData::Rows(_) => {
                    return Err(Error::IndexCorruption(format!(
                        "{}: ran out of levels with criteria left",
                        index.signature()
                    )));
                }
            }
        }
        frontier = next;
    }

    Ok(Vec::new())
}

/// Select the entries of one sequence that satisfy a criterion, in
/// sequence order.
fn select_entries<'a>(node: &'a Node, criterion: &Criterion, out: &mut Vec<&'a Entry>) {
    match (&criterion.op, &criterion.operand) {
        (Operator::Eq, Operand::Scalar(v)) => {
            if let Some(i) = node.exact(v) {
                out.push(&node.entries[i]);
            }
        }
        (Operator::Ne, Operand::Scalar(v)) => {
            let skip = node.exact(v);
            for (i, entry) in node.entries.iter().enumerate() {
                if Some(i) != skip {
                    out.push(entry);
                }
            }
        }
        (Operator::Lt, Operand::Scalar(v))
        | (Operator::Le, Operand::Scalar(v))
        | (Operator::Ge, Operand::Scalar(v))
        | (Operator::Gt, Operand::Scalar(v)) => {
            let (begin, end) = comparison_bounds(node, criterion.op, v);
            out.extend(&node.entries[begin..end]);
        }
        (Operator::Between, Operand::Range(range)) => {
            let (begin, end) = between_bounds(node, range);
            out.extend(&node.entries[begin..end]);
        }
        (Operator::In, Operand::Set(set)) => {
            // The set is deduplicated at construction; probe each value.
            for v in set.iter() {
                if let Some(i) = node.exact(v) {
                    out.push(&node.entries[i]);
                }
            }
        }
        // Operand shapes are validated when the criterion is built.
        _ => {}
    }
}
