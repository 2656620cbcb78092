use std::{fmt, path::PathBuf, str::FromStr};

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};

pub const DEFAULT_THRESHOLD: usize = 3;
pub const DEFAULT_POI_DIR: &str = "path_to_poi_data";
pub const KEY_COLUMN: &str = "safegraph_place_id";
pub const CUSTOMER_ADDRESS_COLUMN: &str = "customer_street_address";
pub const POI_ADDRESS_COLUMN: &str = "street_address";

/// What to do with a row when neither side has an address at all.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MissingAddresses {
    /// Both sides tokenise to the same sentinel and the row passes.
    #[default]
    Keep,
    Drop,
}

impl fmt::Display for MissingAddresses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::Drop => write!(f, "drop"),
        }
    }
}

impl FromStr for MissingAddresses {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "keep" => Self::Keep,
            "drop" => Self::Drop,
            _ => bail!("Unknown missing address policy: {s}"),
        })
    }
}

/// Command line surface of `pollmatch filter`.
#[derive(Clone, Debug, Args)]
pub struct FilterArgs {
    /// Folder holding exactly one `*_matched.csv`
    #[arg(long)]
    pub data: PathBuf,

    /// Folder holding the `core_poi-partN.csv.gz` shards
    #[arg(long, env = "POI_DATA", default_value = DEFAULT_POI_DIR)]
    pub poi_data: PathBuf,

    /// Largest tolerated token count difference, exclusive
    #[arg(long, env = "ADDRESS_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: usize,

    /// Require exactly parts 1..=N instead of using every part found
    #[arg(long)]
    pub shards: Option<usize>,

    #[arg(long, value_enum, default_value_t = MissingAddresses::Keep)]
    pub missing_addresses: MissingAddresses,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterConfig {
    pub data_dir: PathBuf,
    pub poi_dir: PathBuf,
    pub threshold: usize,
    pub shards: Option<usize>,
    pub key_column: String,
    pub customer_address_column: String,
    pub poi_address_column: String,
    pub missing_addresses: MissingAddresses,
}

impl FilterConfig {
    pub fn new(data_dir: impl Into<PathBuf>, poi_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            poi_dir: poi_dir.into(),
            threshold: DEFAULT_THRESHOLD,
            shards: None,
            key_column: KEY_COLUMN.to_string(),
            customer_address_column: CUSTOMER_ADDRESS_COLUMN.to_string(),
            poi_address_column: POI_ADDRESS_COLUMN.to_string(),
            missing_addresses: MissingAddresses::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 {
            bail!("Threshold must be at least 1, every row would be rejected");
        }
        if self.shards == Some(0) {
            bail!("Shard count must be at least 1");
        }
        if self.poi_dir.as_os_str() == DEFAULT_POI_DIR {
            log::warn!("Using placeholder POI folder {DEFAULT_POI_DIR:?}, pass --poi-data");
        }
        Ok(())
    }
}

impl TryFrom<FilterArgs> for FilterConfig {
    type Error = anyhow::Error;

    fn try_from(args: FilterArgs) -> Result<Self> {
        let config = Self {
            threshold: args.threshold,
            shards: args.shards,
            missing_addresses: args.missing_addresses,
            ..Self::new(args.data, args.poi_data)
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FilterArgs {
        FilterArgs {
            data: PathBuf::from("data"),
            poi_data: PathBuf::from("poi"),
            threshold: DEFAULT_THRESHOLD,
            shards: None,
            missing_addresses: MissingAddresses::Keep,
        }
    }

    #[test]
    fn defaults() {
        let config = FilterConfig::try_from(args()).unwrap();
        assert_eq!(config.threshold, 3);
        assert_eq!(config.key_column, "safegraph_place_id");
        assert_eq!(config.customer_address_column, "customer_street_address");
        assert_eq!(config.poi_address_column, "street_address");
        assert_eq!(config.missing_addresses, MissingAddresses::Keep);
    }

    #[test]
    fn rejects_zero_threshold() {
        let mut x = args();
        x.threshold = 0;
        assert!(FilterConfig::try_from(x).is_err());
    }

    #[test]
    fn rejects_zero_shards() {
        let mut x = args();
        x.shards = Some(0);
        assert!(FilterConfig::try_from(x).is_err());
    }

    #[test]
    fn missing_addresses_round_trips_through_str() {
        for x in [MissingAddresses::Keep, MissingAddresses::Drop] {
            assert_eq!(x.to_string().parse::<MissingAddresses>().unwrap(), x);
        }
        assert!("maybe".parse::<MissingAddresses>().is_err());
    }
}
