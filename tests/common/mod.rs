//! Shared states-of-the-union fixture for integration tests.
#![allow(dead_code)]

use rowdex::{Row, Table, Value};

/// (id, name, abbr, inducted, population, capital, region)
pub const STATES: [(i64, &str, &str, i64, i64, &str, &str); 50] = [
    (1, "Alabama", "AL", 1819, 4_627_851, "Montgomery", "South"),
    (2, "Alaska", "AK", 1959, 683_478, "Juneau", "Pacific"),
    (3, "Arizona", "AZ", 1912, 6_338_755, "Phoenix", "Southwest"),
    (4, "Arkansas", "AR", 1836, 2_834_797, "Little Rock", "South"),
    (5, "California", "CA", 1850, 36_553_215, "Sacramento", "West"),
    (6, "Colorado", "CO", 1876, 4_861_515, "Denver", "West"),
    (7, "Connecticut", "CT", 1788, 3_502_309, "Hartford", "Northeast"),
    (8, "Delaware", "DE", 1787, 864_764, "Dover", "South"),
    (9, "Florida", "FL", 1845, 18_251_243, "Tallahassee", "South"),
    (10, "Georgia", "GA", 1788, 9_544_750, "Atlanta", "South"),
    (11, "Hawaii", "HI", 1959, 1_283_388, "Honolulu", "Pacific"),
    (12, "Idaho", "ID", 1890, 1_499_402, "Boise", "West"),
    (13, "Illinois", "IL", 1818, 12_852_548, "Springfield", "Midwest"),
    (14, "Indiana", "IN", 1816, 6_345_289, "Indianapolis", "Midwest"),
    (15, "Iowa", "IA", 1846, 2_988_046, "Des Moines", "Midwest"),
    (16, "Kansas", "KS", 1861, 2_775_997, "Topeka", "Midwest"),
    (17, "Kentucky", "KY", 1792, 4_241_474, "Frankfort", "South"),
    (18, "Louisiana", "LA", 1812, 4_293_204, "Baton Rouge", "South"),
    (19, "Maine", "ME", 1820, 1_317_207, "Augusta", "Northeast"),
    (20, "Maryland", "MD", 1788, 5_618_344, "Annapolis", "South"),
    (21, "Massachusetts", "MA", 1788, 6_449_755, "Boston", "Northeast"),
    (22, "Michigan", "MI", 1837, 10_071_822, "Lansing", "Midwest"),
    (23, "Minnesota", "MN", 1858, 5_197_621, "Saint Paul", "Midwest"),
    (24, "Mississippi", "MS", 1817, 2_918_785, "Jackson", "South"),
    (25, "Missouri", "MO", 1821, 5_878_415, "Jefferson City", "Midwest"),
    (26, "Montana", "MT", 1889, 957_861, "Helena", "West"),
    (27, "Nebraska", "NE", 1867, 1_774_571, "Lincoln", "Midwest"),
    (28, "Nevada", "NV", 1864, 2_565_382, "Carson City", "West"),
    (29, "New Hampshire", "NH", 1788, 1_315_828, "Concord", "Northeast"),
    (30, "New Jersey", "NJ", 1787, 8_685_920, "Trenton", "Northeast"),
    (31, "New Mexico", "NM", 1912, 2_059_179, "Santa Fe", "Southwest"),
    (32, "New York", "NY", 1788, 19_297_729, "Albany", "Northeast"),
    (33, "North Carolina", "NC", 1789, 9_061_032, "Raleigh", "South"),
    (34, "North Dakota", "ND", 1889, 639_715, "Bismarck", "Midwest"),
    (35, "Ohio", "OH", 1803, 11_466_917, "Columbus", "Midwest"),
    (36, "Oklahoma", "OK", 1907, 3_617_316, "Oklahoma City", "Southwest"),
    (37, "Oregon", "OR", 1859, 3_747_455, "Salem", "West"),
    (38, "Pennsylvania", "PA", 1787, 12_432_792, "Harrisburg", "Northeast"),
    (39, "Rhode Island", "RI", 1790, 1_057_832, "Providence", "Northeast"),
    (40, "South Carolina", "SC", 1788, 4_407_709, "Columbia", "South"),
    (41, "South Dakota", "SD", 1889, 796_214, "Pierre", "Midwest"),
    (42, "Tennessee", "TN", 1796, 6_156_719, "Nashville", "South"),
    (43, "Texas", "TX", 1845, 23_904_380, "Austin", "Southwest"),
    (44, "Utah", "UT", 1896, 2_645_330, "Salt Lake City", "West"),
    (45, "Vermont", "VT", 1791, 621_254, "Montpelier", "Northeast"),
    (46, "Virginia", "VA", 1788, 7_712_091, "Richmond", "South"),
    (47, "Washington", "WA", 1889, 6_468_424, "Olympia", "West"),
    (48, "West Virginia", "WV", 1863, 1_812_035, "Charleston", "South"),
    (49, "Wisconsin", "WI", 1848, 5_601_640, "Madison", "Midwest"),
    (50, "Wyoming", "WY", 1890, 522_830, "Cheyenne", "West"),
];

pub const COLUMNS: [&str; 7] = [
    "id",
    "name",
    "abbr",
    "inducted",
    "population",
    "capital",
    "region",
];

pub fn state_rows() -> Vec<Row> {
    STATES
        .iter()
        .map(|(id, name, abbr, inducted, population, capital, region)| {
            Row::from_pairs([
                ("id", Value::Int(*id)),
                ("name", Value::from(*name)),
                ("abbr", Value::from(*abbr)),
                ("inducted", Value::Int(*inducted)),
                ("population", Value::Int(*population)),
                ("capital", Value::from(*capital)),
                ("region", Value::from(*region)),
            ])
        })
        .collect()
}

pub fn states_table() -> Table {
    let mut table = Table::new("states", &COLUMNS).expect("fixture columns are valid");
    table.set_paranoia(true);
    table.insert(state_rows()).expect("fixture rows are valid");
    table
}

pub fn abbrs(rows: &[Row]) -> Vec<String> {
    let mut out: Vec<String> = rows
        .iter()
        .map(|r| {
            r.get("abbr")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default()
        })
        .collect();
    out.sort();
    out
}
