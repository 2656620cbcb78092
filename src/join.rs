use std::collections::HashMap;

use _model::Table;
use anyhow::{bail, Result};

/// Left outer join of `matched` onto `poi` by `key`.
///
/// The output starts with the key column, then the remaining matched columns,
/// then the remaining POI columns. Every matched row appears at least once, in
/// input order; a key that repeats in `poi` yields one row per POI match.
/// Unmatched rows and rows with a null key get nulls for the POI columns.
pub fn left_join(matched: &Table, poi: &Table, key: &str) -> Result<Table> {
    let left_key = matched.require(key)?;
    let right_key = poi.require(key)?;

    let right_rest = (0..poi.columns.len())
        .filter(|i| *i != right_key)
        .collect::<Vec<_>>();

    let overlap = right_rest
        .iter()
        .map(|i| &poi.columns[*i])
        .filter(|x| matched.column(x).is_some())
        .collect::<Vec<_>>();
    if !overlap.is_empty() {
        bail!("Columns overlap between matched and POI data: {overlap:?}");
    }

    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in poi.rows.iter().enumerate() {
        if let Some(id) = &row[right_key] {
            index.entry(id.as_str()).or_default().push(i);
        }
    }

    let mut columns = matched.columns.clone();
    columns.extend(right_rest.iter().map(|i| poi.columns[*i].clone()));
    let mut out = Table::new(columns);

    for row in &matched.rows {
        let hits = row[left_key]
            .as_deref()
            .and_then(|id| index.get(id))
            .map(Vec::as_slice)
            .unwrap_or_default();

        if hits.is_empty() {
            let mut joined = row.clone();
            joined.resize(out.columns.len(), None);
            out.push(joined)?;
            continue;
        }
        for &hit in hits {
            let mut joined = row.clone();
            joined.extend(right_rest.iter().map(|i| poi.rows[hit][*i].clone()));
            out.push(joined)?;
        }
    }

    out.set_index(key)?;
    Ok(out)
}
