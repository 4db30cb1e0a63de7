/// Rowdex Query Planner
///
/// For a conjunction of criteria the planner prices every available access
/// path and picks the cheapest. The full-scan baseline costs one pass over
/// all rows with every criterion evaluated per row. An index path descends
/// the index columns in order: each column with a criterion charges a
/// binary-search probe (`log2` of the sequence length) plus the predicted
/// result cardinality, read straight off the entry subtotals.
///
/// An exact-match equality keeps the descent on a single real subtree.
/// Any other operator leaves a spread of entries, so deeper levels are
/// priced against a synthetic sequence of the predicted `(length, total)`
/// using fixed selectivity ratios instead of probes.
///
/// The baseline is seeded first and only replaced on strict improvement,
/// so a tie always resolves to the scan.

use crate::error::Result;
use crate::index::{EntryData, Index, Node};
use crate::operand::Range;
use crate::query::{Criterion, Operand, Operator};

/// The planner's decision for one query: the chosen access path, its
/// estimated cost, and the split of criteria into the ones the index
/// satisfies and the residual ones applied by filtering.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub cost: f64,
    /// Signature of the chosen index, or `None` for a full scan.
    pub signature: Option<String>,
    pub used: Vec<Criterion>,
    pub unused: Vec<Criterion>,
}

impl QueryPlan {
    pub fn is_full_scan(&self) -> bool {
        self.signature.is_none()
    }
}

fn log2(len: f64) -> f64 {
    len.max(1.0).log2()
}

/// Cost of filtering every row against every criterion.
pub(crate) fn scan_plan(row_count: usize, criteria: &[Criterion]) -> QueryPlan {
    let per_row: f64 = criteria.iter().map(|c| c.single_row_cost()).sum();
    QueryPlan {
        cost: row_count as f64 * per_row,
        signature: None,
        used: Vec::new(),
        unused: criteria.to_vec(),
    }
}

/// Pick the cheapest access path for `criteria` across the scan baseline
/// and every live index.
pub(crate) fn plan(
    row_count: usize,
    indexes: &[Index],
    criteria: &[Criterion],
) -> Result<QueryPlan> {
    let mut best = scan_plan(row_count, criteria);
    for index in indexes {
        if index.is_dropped() {
            continue;
        }
        let candidate = cost_for_index(index, criteria)?;
        if candidate.cost < best.cost {
            best = candidate;
        }
    }
    Ok(best)
}

/// What one probed or estimated criterion predicts for the level below.
struct Estimate<'a> {
    /// Predicted number of rows surviving the criterion.
    rows: f64,
    /// Predicted number of entries matched at this level.
    entries: f64,
    /// Extra search cost beyond the first probe.
    extra: f64,
    /// Real subtree to keep walking; only an exact equality match has one.
    descend: Option<&'a Node>,
}

/// Where the descent currently stands: on a real sequence it can probe,
/// or on a synthetic `(length, total)` shape it can only estimate.
enum Cursor<'a> {
    Probed(&'a Node),
    Statistical { len: f64, total: f64 },
}

/// Price answering `criteria` through `index`.
pub(crate) fn cost_for_index(index: &Index, criteria: &[Criterion]) -> Result<QueryPlan> {
    let root = index.root()?;
    let mut remaining: Vec<Criterion> = criteria.to_vec();
    let mut used: Vec<Criterion> = Vec::new();
    let mut cost = 0.0;
    let mut expected = root.total as f64;
    let mut cursor = Cursor::Probed(root);

    for column in index.columns() {
        let Some(pos) = remaining.iter().position(|c| c.column == *column) else {
            // Unconstrained column: deeper levels only help via filtering.
            break;
        };
        let criterion = remaining.remove(pos);

        match cursor {
            Cursor::Probed(node) => {
                cost += log2(node.len() as f64);
                let est = probe_estimate(node, &criterion);
                cost += est.extra;
                cost += est.rows;
                expected = est.rows;
                cursor = match est.descend {
                    Some(child) => Cursor::Probed(child),
                    None => Cursor::Statistical {
                        len: est.entries,
                        total: est.rows,
                    },
                };
            }
            Cursor::Statistical { len, total } => {
                cost += log2(len);
                let (rows, entries) = statistical_estimate(len, total, &criterion);
                cost += rows;
                expected = rows;
                cursor = Cursor::Statistical {
                    len: entries,
                    total: rows,
                };
            }
        }
        used.push(criterion);
    }

    let residual: f64 = remaining.iter().map(|c| c.single_row_cost()).sum();
    cost += expected * (residual + 1.0);

    Ok(QueryPlan {
        cost,
        signature: Some(index.signature().to_string()),
        used,
        unused: remaining,
    })
}

/// Predict result cardinality for one criterion by probing a real
/// sequence. Subtotals turn the probe into row counts without walking.
fn probe_estimate<'a>(node: &'a Node, criterion: &Criterion) -> Estimate<'a> {
    let len = node.len() as f64;
    let total = node.total as f64;
    let nothing = Estimate {
        rows: 0.0,
        entries: 0.0,
        extra: 0.0,
        descend: None,
    };

    match (&criterion.op, &criterion.operand) {
        (Operator::Eq, Operand::Scalar(v)) => match node.exact(v) {
            Some(i) => {
                let entry = &node.entries[i];
                let descend = match &entry.data {
                    EntryData::Nested(child) => Some(child),
                    EntryData::Rows(_) => None,
                };
                Estimate {
                    rows: entry.size as f64,
                    entries: 1.0,
                    extra: 0.0,
                    descend,
                }
            }
            None => nothing,
        },
        (Operator::Ne, Operand::Scalar(v)) => match node.exact(v) {
            Some(i) => Estimate {
                rows: total - node.entries[i].size as f64,
                entries: len - 1.0,
                extra: 0.0,
                descend: None,
            },
            None => Estimate {
                rows: total,
                entries: len,
                extra: 0.0,
                descend: None,
            },
        },
        (Operator::Lt, Operand::Scalar(v))
        | (Operator::Le, Operand::Scalar(v))
        | (Operator::Ge, Operand::Scalar(v))
        | (Operator::Gt, Operand::Scalar(v)) => {
            let (begin, end) = comparison_bounds(node, criterion.op, v);
            Estimate {
                rows: (node.prefix(end) - node.prefix(begin)) as f64,
                entries: (end - begin) as f64,
                extra: 0.0,
                descend: None,
            }
        }
        (Operator::Between, Operand::Range(range)) => {
            let (begin, end) = between_bounds(node, range);
            Estimate {
                rows: (node.prefix(end) - node.prefix(begin)) as f64,
                entries: (end - begin) as f64,
                // Second bound means a second probe.
                extra: log2(len),
                descend: None,
            }
        }
        (Operator::In, Operand::Set(set)) => {
            let k = set.len();
            match k {
                0 => nothing,
                1 => {
                    let v = set.iter().next().cloned().unwrap_or(crate::value::Value::Null);
                    match node.exact(&v) {
                        Some(i) => Estimate {
                            rows: node.entries[i].size as f64,
                            entries: 1.0,
                            extra: 0.0,
                            descend: None,
                        },
                        None => nothing,
                    }
                }
                _ => {
                    let k = k as f64;
                    Estimate {
                        rows: (k * total / len.max(1.0)).ceil().min(total),
                        entries: k,
                        extra: log2(len) * (k.log2() - 1.0),
                        descend: None,
                    }
                }
            }
        }
        // Operand shapes are validated when the criterion is built.
        _ => nothing,
    }
}

/// Half-open entry range `[begin, end)` selected by a comparison against
/// a probed sequence.
pub(crate) fn comparison_bounds(node: &Node, op: Operator, v: &crate::value::Value) -> (usize, usize) {
    match op {
        Operator::Lt => (0, node.lower_bound(v)),
        Operator::Le => (0, node.upper_bound(v)),
        Operator::Ge => (node.lower_bound(v), node.len()),
        Operator::Gt => (node.upper_bound(v), node.len()),
        _ => (0, 0),
    }
}

/// Half-open entry range selected by a `between` range, honouring the
/// exclusive upper bound.
pub(crate) fn between_bounds(node: &Node, range: &Range) -> (usize, usize) {
    let begin = node.lower_bound(range.start());
    let end = if range.is_exclusive() {
        node.lower_bound(range.end())
    } else {
        node.upper_bound(range.end())
    };
    (begin, end.max(begin))
}

/// Selectivity ratios used once the descent has left the real tree:
/// equality keeps an average bucket, comparisons keep two thirds,
/// `between` keeps a third. Returns `(rows, entries)`.
fn statistical_estimate(len: f64, total: f64, criterion: &Criterion) -> (f64, f64) {
    let len = len.max(1.0);
    match (&criterion.op, &criterion.operand) {
        // One average-sized bucket survives an equality.
        (Operator::Eq, _) => (total / len, 1.0),
        (Operator::Ne, _) => (total - total / len, (len - 1.0).max(0.0)),
        (Operator::Lt, _) | (Operator::Le, _) | (Operator::Ge, _) | (Operator::Gt, _) => {
            (total * 2.0 / 3.0, len * 2.0 / 3.0)
        }
        (Operator::Between, _) => (total / 3.0, len / 3.0),
        (Operator::In, Operand::Set(set)) => {
            let k = (set.len() as f64).max(1.0);
            ((k * total / len).min(total), k.min(len))
        }
        _ => (total, len),
    }
}
