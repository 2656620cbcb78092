use std::{fs, io::Write, path::Path};

use flate2::{write::GzEncoder, Compression};
use pollmatch::{
    config::{FilterConfig, MissingAddresses},
    loader::load_csv,
    pipeline,
};

fn gz(path: &Path, contents: &str) {
    let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

const MATCHED: &str = "\
Precinct,safegraph_place_id,customer_street_address
P1,sg-1,123 Main St
P2,sg-2,123 Main St
P3,sg-missing,
P4,sg-4,12 Elm Rd
P5,,
";

fn setup(dir: &Path) {
    let data = dir.join("data");
    let poi = dir.join("poi");
    fs::create_dir_all(&data).unwrap();
    fs::create_dir_all(&poi).unwrap();

    fs::write(data.join("nc_2018_matched.csv"), MATCHED).unwrap();
    fs::write(data.join("nc_2018_preprocessed.csv"), "ignored\n").unwrap();

    let shards = [
        "safegraph_place_id,location_name,street_address\nsg-1,School,123 Main Street\n",
        "safegraph_place_id,location_name,street_address\nsg-2,Church,456 Oak Ave\n",
        "safegraph_place_id,location_name,street_address\nsg-4,Library,12 Elm Road\n",
        "safegraph_place_id,location_name,street_address\nsg-4,Library Annex,900 Far Away Blvd\n",
    ];
    for (i, x) in shards.iter().enumerate() {
        gz(&poi.join(format!("core_poi-part{}.csv.gz", i + 1)), x);
    }
}

fn column(path: &Path, name: &str) -> Vec<Option<String>> {
    let table = load_csv(path).unwrap();
    let i = table.require(name).unwrap();
    table.rows.into_iter().map(|x| x[i].clone()).collect()
}

#[test]
fn filters_matched_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());

    let config = FilterConfig {
        shards: Some(4),
        ..FilterConfig::new(dir.path().join("data"), dir.path().join("poi"))
    };
    let summary = pipeline::run(&config).unwrap();

    assert_eq!(summary.matched, 5);
    assert_eq!(summary.poi, 4);
    // sg-4 appears twice in the POI data
    assert_eq!(summary.joined, 6);
    assert_eq!(summary.output, dir.path().join("data/nc_2018_filtered.csv"));

    let precincts = column(&summary.output, "Precinct");
    assert_eq!(
        precincts,
        ["P1", "P3", "P4", "P5"]
            .map(|x| Some(x.to_string()))
            .to_vec()
    );
    assert_eq!(summary.kept, 4);

    let table = load_csv(&summary.output).unwrap();
    assert_eq!(table.columns[0], "safegraph_place_id");
    assert_eq!(table.get(2, "location_name"), Some("Library"));
    assert_eq!(table.get(1, "street_address"), None);
}

#[test]
fn dropping_missing_addresses() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());

    let config = FilterConfig {
        missing_addresses: MissingAddresses::Drop,
        ..FilterConfig::new(dir.path().join("data"), dir.path().join("poi"))
    };
    let summary = pipeline::run(&config).unwrap();

    let precincts = column(&summary.output, "Precinct");
    assert_eq!(precincts, ["P1", "P4"].map(|x| Some(x.to_string())).to_vec());
}

#[test]
fn missing_shard_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    fs::remove_file(dir.path().join("poi/core_poi-part3.csv.gz")).unwrap();

    let config = FilterConfig {
        shards: Some(4),
        ..FilterConfig::new(dir.path().join("data"), dir.path().join("poi"))
    };
    assert!(pipeline::run(&config).is_err());
    assert!(!dir.path().join("data/nc_2018_filtered.csv").exists());
}

#[test]
fn ambiguous_matched_files_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    fs::write(dir.path().join("data/other_matched.csv"), MATCHED).unwrap();

    let config = FilterConfig::new(dir.path().join("data"), dir.path().join("poi"));
    assert!(pipeline::run(&config).is_err());
    assert!(!dir.path().join("data/nc_2018_filtered.csv").exists());
}

#[test]
fn gap_in_shards_is_fatal_without_a_fixed_count() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    fs::remove_file(dir.path().join("poi/core_poi-part3.csv.gz")).unwrap();

    let config = FilterConfig::new(dir.path().join("data"), dir.path().join("poi"));
    let err = pipeline::run(&config).unwrap_err().to_string();
    assert!(err.contains("Missing POI shards 3"), "{err}");
    assert!(!dir.path().join("data/nc_2018_filtered.csv").exists());
}

#[test]
fn header_only_matched_file_writes_header_only_output() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path());
    fs::write(
        dir.path().join("data/nc_2018_matched.csv"),
        "Precinct,safegraph_place_id,customer_street_address\n",
    )
    .unwrap();

    let config = FilterConfig::new(dir.path().join("data"), dir.path().join("poi"));
    let summary = pipeline::run(&config).unwrap();
    assert_eq!((summary.matched, summary.joined, summary.kept), (0, 0, 0));

    let table = load_csv(&summary.output).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.columns[0], "safegraph_place_id");
}
