/// Walkthrough over a small states table: indexes, planned queries,
/// updates through clones, and the index snapshot.
///
/// Run with `RUST_LOG=debug` to see the operation-event stream.

use rowdex::{Range, Row, Table, Value, ValueSet};

fn state(abbr: &str, name: &str, region: &str, pop: i64) -> Row {
    Row::from_pairs([
        ("abbr", Value::from(abbr)),
        ("name", Value::from(name)),
        ("region", Value::from(region)),
        ("population", Value::Int(pop)),
    ])
}

fn main() -> rowdex::Result<()> {
    env_logger::init();

    let mut table = Table::new("states", &["abbr", "name", "region", "population"])?;
    table.set_verbose(true);
    table.set_paranoia(true);

    table.insert(vec![
        state("CA", "California", "West", 36_553_215),
        state("OR", "Oregon", "West", 3_747_455),
        state("WA", "Washington", "West", 6_468_424),
        state("NV", "Nevada", "West", 2_565_382),
        state("TX", "Texas", "Southwest", 23_904_380),
        state("NM", "New Mexico", "Southwest", 2_059_179),
        state("NY", "New York", "Northeast", 19_297_729),
        state("ME", "Maine", "Northeast", 1_317_207),
        state("RI", "Rhode Island", "Northeast", 1_057_832),
    ])?;

    table.add_index(&["region", "population"])?;
    table.add_index(&["abbr"])?;

    println!("== rows in the West over 5M ==");
    let rows = table
        .find_where("region", "==", "West")?
        .and("population", ">", 5_000_000i64)?
        .get_rows()?;
    for row in &rows {
        println!(
            "  {} ({})",
            row.get("name").and_then(|v| v.as_str()).unwrap_or("?"),
            row.get("population").and_then(|v| v.as_int()).unwrap_or(0)
        );
    }

    println!("== plan comparison ==");
    let plan = table
        .find_where("population", "between", Range::new(1_000_000i64, 3_000_000i64))?
        .explain()?;
    println!(
        "  between query: {} at cost {:.2}",
        plan.signature.as_deref().unwrap_or("full scan"),
        plan.cost
    );

    println!("== set probe ==");
    let rows = table
        .find_where("abbr", "in", ValueSet::of(["CA", "TX", "ZZ"]))?
        .get_rows()?;
    println!("  matched {} of 3 probed abbreviations", rows.len());

    println!("== update through a clone ==");
    let mut ca = table.find_where("abbr", "==", "CA")?.get_rows()?.remove(0);
    ca.set("population", 40_000_000i64);
    table.update(std::slice::from_ref(&ca))?;
    println!(
        "  CA now {}",
        ca.snapshot()
            .get("population")
            .and_then(|v| v.as_int())
            .unwrap_or(0)
    );

    println!("== index snapshot ==");
    let snapshot = table.index(&["region", "population"])?.snapshot()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).unwrap_or_default()
    );

    Ok(())
}
