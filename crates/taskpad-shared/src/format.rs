//! Display formatting helpers: compact pt-BR number notation for the
//! landing counters and the `dd/mm/yyyy` date label shown on records.

use chrono::{DateTime, Utc};

/// Scale thresholds with their pt-BR compact suffixes.
const UNITS: [(u64, &str); 4] = [
    (1_000_000_000_000, "tri"),
    (1_000_000_000, "bi"),
    (1_000_000, "mi"),
    (1_000, "mil"),
];

/// Format a count in pt-BR compact notation.
///
/// Mirrors `Intl.NumberFormat("pt-BR", { notation: "compact" })`:
/// one decimal (comma separator) while the scaled value is below 10,
/// integer otherwise. `1200` becomes `"1,2 mil"`, `12_345` becomes
/// `"12 mil"`, `3_400_000` becomes `"3,4 mi"`.
pub fn format_compact(value: u64) -> String {
    let Some(mut idx) = UNITS.iter().position(|(unit, _)| value >= *unit) else {
        return value.to_string();
    };
    loop {
        let (unit, suffix) = UNITS[idx];
        let scaled = value as f64 / unit as f64;
        if scaled >= 10.0 {
            let rounded = scaled.round() as u64;
            // Rounding can carry into the next unit: 999_950 is "1 mi".
            if rounded >= 1000 && idx > 0 {
                idx -= 1;
                continue;
            }
            return format!("{rounded} {suffix}");
        }
        let tenths = (scaled * 10.0).round() as u64;
        return if tenths % 10 == 0 {
            format!("{} {}", tenths / 10, suffix)
        } else {
            format!("{},{} {}", tenths / 10, tenths % 10, suffix)
        };
    }
}

/// Date label shown on tasks and comments (`dd/mm/yyyy`).
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%d/%m/%Y").to_string()
}
