use std::{fmt, path::PathBuf, time::Instant};

use anyhow::Result;
use log::{info, warn};

use crate::{
    config::FilterConfig,
    filter::AddressFilter,
    join::left_join,
    loader::{discover_shards, find_matched_file, load_matched, load_poi},
    utils::shape,
    writer::{filtered_path, write_csv},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub matched: usize,
    pub poi: usize,
    pub joined: usize,
    pub kept: usize,
    pub output: PathBuf,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Statistics")?;
        writeln!(f, "- {} matched, {} poi", self.matched, self.poi)?;
        writeln!(f, "- {} after joining", self.joined)?;
        writeln!(
            f,
            "- {} kept, {} rejected ({:.01}% kept)",
            self.kept,
            self.joined - self.kept,
            if self.joined == 0 {
                0.0
            } else {
                self.kept as f64 / self.joined as f64 * 100.0
            }
        )?;
        write!(f, "- written to {}", self.output.display())
    }
}

/// Finds the matched file, joins it against the POI shards, drops rows whose
/// addresses disagree and writes the rest next to the input.
pub fn run(config: &FilterConfig) -> Result<Summary> {
    let start = Instant::now();

    // resolve every input before doing any work
    let path = find_matched_file(&config.data_dir)?;
    let output = filtered_path(&path)?;
    let shards = discover_shards(&config.poi_dir, config.shards)?;

    let matched = load_matched(&path)?;
    if matched.is_empty() {
        warn!("{path:?} has no rows, the output will be empty");
    }
    let poi = load_poi(&shards)?;

    let joined = left_join(&matched, &poi, &config.key_column)?;
    info!("Shape after joining: {:?}", shape(&joined));

    let filter = AddressFilter::from(config);
    let filtered = filter.apply(&joined)?;
    info!("Shape after filtering: {:?}", shape(&filtered));

    write_csv(&output, &filtered)?;
    info!("Wrote {output:?} in {:.2?}", start.elapsed());

    Ok(Summary {
        matched: matched.len(),
        poi: poi.len(),
        joined: joined.len(),
        kept: filtered.len(),
        output,
    })
}
