use std::{
    fs::{self, File},
    io::{BufReader, Read},
    path::{Path, PathBuf},
    time::Instant,
};

use _model::Table;
use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use itertools::Itertools;
use log::info;

use crate::utils::file_progress;

// read as null, the same set a data frame reader uses by default
const NULL_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub const MATCHED_SUFFIX: &str = "_matched.csv";
const SHARD_PREFIX: &str = "core_poi-part";
const SHARD_EXTENSIONS: [&str; 3] = [".csv.gz", ".csv.zst", ".csv"];

/// Finds the single `*_matched.csv` in `dir`. Anything other than exactly
/// one candidate is an error; picking one silently could filter the wrong run.
pub fn find_matched_file(dir: &Path) -> Result<PathBuf> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {dir:?}"))? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|x| x.to_str())
            .is_some_and(|x| x.ends_with(MATCHED_SUFFIX));
        if matches && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    info!("Found file: {found:?}");

    match found.len() {
        1 => Ok(found.remove(0)),
        0 => bail!("No files with the suffix '{MATCHED_SUFFIX}' found in {dir:?}"),
        _ => bail!(
            "Multiple files with the suffix '{MATCHED_SUFFIX}' are found, which do you want to use? {}",
            found.iter().map(|x| x.display()).join(", ")
        ),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shard {
    pub part: usize,
    pub path: PathBuf,
}

fn parse_shard(name: &str) -> Option<usize> {
    let rest = name.strip_prefix(SHARD_PREFIX)?;
    SHARD_EXTENSIONS
        .iter()
        .find_map(|ext| rest.strip_suffix(ext))?
        .parse()
        .ok()
}

/// Lists POI shards under `dir` ordered by part number. Parts `1..=expected`
/// must all be present and nothing else is used; without `expected` every part
/// up to the highest one found must be present.
pub fn discover_shards(dir: &Path, expected: Option<usize>) -> Result<Vec<Shard>> {
    let mut shards = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read POI folder {dir:?}"))? {
        let path = entry?.path();
        if let Some(part) = path.file_name().and_then(|x| x.to_str()).and_then(parse_shard) {
            shards.push(Shard { part, path });
        }
    }
    // prefer .csv.gz over other encodings of the same part
    shards.sort_by_key(|x| (x.part, extension_rank(&x.path)));
    shards.dedup_by_key(|x| x.part);

    shards.retain(|x| x.part >= 1);
    if shards.is_empty() {
        bail!("No {SHARD_PREFIX}N.csv.gz shards found in {dir:?}");
    }

    // without a fixed count the highest part found sets it, so a gap is still fatal
    let n = expected.unwrap_or_else(|| shards.iter().map(|x| x.part).max().unwrap_or(0));
    shards.retain(|x| x.part <= n);
    let missing = (1..=n)
        .filter(|i| !shards.iter().any(|x| x.part == *i))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "Missing POI shards {} in {dir:?} (expected {SHARD_PREFIX}1..{n})",
            missing.iter().join(", ")
        );
    }

    Ok(shards)
}

fn extension_rank(path: &Path) -> usize {
    let name = path.to_string_lossy();
    SHARD_EXTENSIONS
        .iter()
        .position(|ext| name.ends_with(ext))
        .unwrap_or(SHARD_EXTENSIONS.len())
}

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("Failed to open {path:?}"))?;
    let name = path.to_string_lossy();
    Ok(if name.ends_with(".gz") {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else if name.ends_with(".zst") {
        Box::new(zstd::Decoder::new(file)?)
    } else {
        Box::new(BufReader::new(file))
    })
}

/// Reads a comma separated file, decompressing by extension. Empty fields and
/// markers such as `NA` or `nan` become nulls.
pub fn load_csv(path: &Path) -> Result<Table> {
    read_csv(open(path)?).with_context(|| format!("Failed to parse {path:?}"))
}

pub fn read_csv(input: impl Read) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().from_reader(input);
    let columns = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record?;
        table.push(
            record
                .iter()
                .map(|x| (!NULL_VALUES.contains(&x)).then(|| x.to_string()))
                .collect(),
        )?;
    }

    Ok(table)
}

pub fn load_matched(path: &Path) -> Result<Table> {
    let table = load_csv(path)?;
    info!("Columns {:?}", table.columns);
    info!("{} rows", table.len());
    Ok(table)
}

/// Loads and concatenates every shard. Rows are kept as is, duplicate
/// identifiers included.
pub fn load_poi(shards: &[Shard]) -> Result<Table> {
    info!("Loading POI data");
    let pb = file_progress(shards.len() as u64, "POI shards");

    let mut poi = Table::default();
    for (i, shard) in shards.iter().enumerate() {
        let start = Instant::now();
        let table = load_csv(&shard.path)?;
        let rows = table.len();
        poi.concat(table);
        pb.inc(1);
        info!(
            "Loaded POI file {}/{} ({rows} rows). {:.2} seconds.",
            i + 1,
            shards.len(),
            start.elapsed().as_secs_f64()
        );
    }
    pb.finish_and_clear();

    Ok(poi)
}
