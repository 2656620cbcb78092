//! Turns a raw state polling place export into the layout the matcher reads.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use encoding_rs::UTF_16LE;
use itertools::Itertools;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// One line of the tab separated export.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPollingPlace {
    election_dt: String,
    county_name: String,
    polling_place_id: String,
    polling_place_name: String,
    precinct_name: String,
    house_num: String,
    street_name: String,
    city: String,
    state: String,
    zip: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PollingPlace {
    pub election_date: String,
    #[serde(rename = "County")]
    pub county: String,
    pub polling_place_id: String,
    pub polling_place_name: String,
    #[serde(rename = "Precinct")]
    pub precinct: String,
    pub house_num: String,
    pub street_name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    pub zip: String,
    pub street_address: String,
}

impl From<RawPollingPlace> for PollingPlace {
    fn from(x: RawPollingPlace) -> Self {
        let street_address = format!("{} {}", x.house_num, x.street_name);
        Self {
            election_date: x.election_dt,
            county: x.county_name,
            polling_place_id: x.polling_place_id,
            polling_place_name: x.polling_place_name,
            precinct: x.precinct_name,
            house_num: x.house_num,
            street_name: x.street_name,
            city: x.city,
            state: x.state,
            zip: x.zip,
            street_address,
        }
    }
}

/// `polling_place_20181106.csv` -> `polling_place_20181106_preprocessed.csv`
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_preprocessed.csv"))
}

/// Decodes UTF-16 (byte order from the BOM, little endian without one).
pub fn decode(bytes: &[u8]) -> String {
    let (text, encoding, malformed) = UTF_16LE.decode(bytes);
    if malformed {
        warn!("Replaced malformed {} sequences", encoding.name());
    }
    text.into_owned()
}

/// Parses the export. Each line is trimmed as a whole, fields are not, and
/// lines shorter than the header are padded with empty fields.
pub fn parse(text: &str) -> Result<Vec<PollingPlace>> {
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(lines.as_bytes());
    let headers = reader.headers()?.clone();

    let mut output = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let mut record = record?;
        while record.len() < headers.len() {
            record.push_field("");
        }
        let place: RawPollingPlace = record
            .deserialize(Some(&headers))
            .with_context(|| format!("Failed to parse line {}", i + 2))?;
        output.push(place.into());
    }
    Ok(output)
}

pub fn run(input: &Path, output: &Path) -> Result<usize> {
    let bytes = fs::read(input).with_context(|| format!("Failed to read {input:?}"))?;
    let places = parse(&decode(&bytes))?;
    info!("Loaded data: {} rows", places.len());

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to create {output:?}"))?;
    for x in &places {
        writer.serialize(x)?;
    }
    writer.flush()?;
    info!("Wrote {output:?}");

    Ok(places.len())
}
