/// End-to-end query scenarios over the states fixture.

mod common;

use common::{abbrs, states_table};
use rowdex::{Error, Range, Value, ValueSet};

#[test]
fn region_equality_returns_the_western_states() {
    let table = states_table();
    let rows = table
        .find_where("region", "==", "West")
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(
        abbrs(&rows),
        vec!["CA", "CO", "ID", "MT", "NV", "OR", "UT", "WA", "WY"]
    );
}

#[test]
fn region_index_returns_identical_rows_at_lower_cost() {
    let mut table = states_table();

    let scan = table
        .find_where("region", "==", "West")
        .unwrap()
        .get_rows()
        .unwrap();
    let scan_plan = table
        .find_where("region", "==", "West")
        .unwrap()
        .explain()
        .unwrap();
    assert!(scan_plan.is_full_scan());

    table.add_index(&["region", "population"]).unwrap();

    let indexed = table
        .find_where("region", "==", "West")
        .unwrap()
        .get_rows()
        .unwrap();
    let indexed_plan = table
        .find_where("region", "==", "West")
        .unwrap()
        .explain()
        .unwrap();

    assert_eq!(abbrs(&scan), abbrs(&indexed));
    assert_eq!(
        indexed_plan.signature.as_deref(),
        Some("[region,population]")
    );
    assert!(indexed_plan.cost < scan_plan.cost);
}

#[test]
fn population_between_selects_the_closed_interval() {
    let table = states_table();
    let rows = table
        .find_where("population", "between", Range::new(1_000_000i64, 2_000_000i64))
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(abbrs(&rows), vec!["HI", "ID", "ME", "NE", "NH", "RI", "WV"]);
}

#[test]
fn population_between_agrees_with_an_index() {
    let mut table = states_table();
    table.add_index(&["population"]).unwrap();
    let rows = table
        .find_where("population", "between", Range::new(1_000_000i64, 2_000_000i64))
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(abbrs(&rows), vec!["HI", "ID", "ME", "NE", "NH", "RI", "WV"]);

    let plan = table
        .find_where("population", "between", Range::new(1_000_000i64, 2_000_000i64))
        .unwrap()
        .explain()
        .unwrap();
    assert_eq!(plan.signature.as_deref(), Some("[population]"));
}

#[test]
fn abbr_in_set_returns_the_named_states() {
    let table = states_table();
    let rows = table
        .find_where("abbr", "in", ValueSet::of(["CA", "TX", "NY"]))
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(rows.len(), 3);

    let mut populations: Vec<i64> = rows
        .iter()
        .map(|r| r.get("population").and_then(|v| v.as_int()).unwrap())
        .collect();
    populations.sort();
    assert_eq!(populations, vec![19_297_729, 23_904_380, 36_553_215]);

    // With an abbr index the same query probes each set member.
    let mut table = table;
    table.add_index(&["abbr"]).unwrap();
    let indexed = table
        .find_where("abbr", "in", ValueSet::of(["CA", "TX", "NY"]))
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(abbrs(&indexed), vec!["CA", "NY", "TX"]);
}

#[test]
fn updated_population_moves_to_the_index_tail() {
    let mut table = states_table();
    table.add_index(&["population"]).unwrap();

    let mut ca = table
        .find_where("abbr", "==", "CA")
        .unwrap()
        .get_rows()
        .unwrap()
        .remove(0);
    ca.set("population", 40_000_000i64);
    table.update(std::slice::from_ref(&ca)).unwrap();

    // The population index now ends at the new value.
    let snapshot = table.index(&["population"]).unwrap().snapshot().unwrap();
    let last = snapshot.entries.last().unwrap();
    assert_eq!(last.value, Value::Int(40_000_000));
    assert_eq!(last.subtotal, 50);

    let rows = table
        .find_where("population", ">", 30_000_000i64)
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(abbrs(&rows), vec!["CA"]);
}

#[test]
fn dropped_table_refuses_all_operations() {
    let mut table = states_table();
    table.destroy().unwrap();

    assert!(matches!(table.get_count(), Err(Error::TableDropped(_))));
    assert!(matches!(
        table.insert(common::state_rows()),
        Err(Error::TableDropped(_))
    ));
    assert!(matches!(
        table
            .find_where("region", "==", "West")
            .map(|q| q.criteria().len()),
        Err(Error::TableDropped(_))
    ));
}

#[test]
fn conjunction_with_residual_filter() {
    let mut table = states_table();
    table.add_index(&["region"]).unwrap();

    // The region criterion reduces through the index; the inducted
    // criterion has no index column and is filtered afterwards.
    let rows = table
        .find_where("region", "==", "West")
        .unwrap()
        .and("inducted", ">=", 1890i64)
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(abbrs(&rows), vec!["ID", "UT", "WY"]);

    let plan = table
        .find_where("region", "==", "West")
        .unwrap()
        .and("inducted", ">=", 1890i64)
        .unwrap()
        .explain()
        .unwrap();
    assert_eq!(plan.used.len(), 1);
    assert_eq!(plan.unused.len(), 1);
    assert_eq!(plan.unused[0].column, "inducted");
}

#[test]
fn not_equal_excludes_exactly_one_key() {
    let mut table = states_table();
    table.add_index(&["region"]).unwrap();
    let rows = table
        .find_where("region", "!=", "West")
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(rows.len(), 41);
    assert!(abbrs(&rows).iter().all(|a| a != "CA" && a != "WY"));
}

#[test]
fn comparison_operators_cover_the_edges() {
    let table = states_table();

    // Smallest and largest populations by strict comparison.
    let below = table
        .find_where("population", "<", 630_000i64)
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(abbrs(&below), vec!["VT", "WY"]);

    let le = table
        .find_where("population", "<=", 639_715i64)
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(abbrs(&le), vec!["ND", "VT", "WY"]);

    let ge = table
        .find_where("population", ">=", 23_904_380i64)
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(abbrs(&ge), vec!["CA", "TX"]);
}

#[test]
fn exclusive_range_drops_the_upper_endpoint() {
    let mut table = states_table();
    table.add_index(&["population"]).unwrap();

    // WV sits exactly at 1,812,035; the exclusive range must skip it.
    let rows = table
        .find_where(
            "population",
            "between",
            Range::exclusive(1_000_000i64, 1_812_035i64),
        )
        .unwrap()
        .get_rows()
        .unwrap();
    assert_eq!(abbrs(&rows), vec!["HI", "ID", "ME", "NE", "NH", "RI"]);
}
