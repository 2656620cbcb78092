use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use _model::Table;
use anyhow::{bail, Context, Result};

const INPUT_TOKEN: &str = "_matched";
const OUTPUT_TOKEN: &str = "_filtered";

/// `out/polls_matched.csv` -> `out/polls_filtered.csv`. Only the file name is
/// rewritten, a `_matched` folder along the way is left alone.
pub fn filtered_path(matched: &Path) -> Result<PathBuf> {
    let name = matched
        .file_name()
        .and_then(|x| x.to_str())
        .with_context(|| format!("Not a file name: {matched:?}"))?;
    if !name.contains(INPUT_TOKEN) {
        bail!("{matched:?} has no {INPUT_TOKEN:?} in its name");
    }
    Ok(matched.with_file_name(name.replace(INPUT_TOKEN, OUTPUT_TOKEN)))
}

/// Writes `table` as CSV, replacing whatever is at `path`. Nulls are written
/// as empty fields.
pub fn write_csv(path: &Path, table: &Table) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {path:?}"))?;
    let mut writer = BufWriter::new(file);
    write_table(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

pub fn write_table(output: impl Write, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|x| x.as_deref().unwrap_or_default()))?;
    }
    writer.flush()?;
    Ok(())
}
