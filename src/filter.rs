use _model::{AddressTokens, Table};
use anyhow::Result;

use crate::config::{FilterConfig, MissingAddresses, DEFAULT_THRESHOLD};

/// Drops matches whose street addresses disagree by `threshold` or more words.
///
/// Both addresses are reduced to sets of lower-case words. A row survives when
/// each side has fewer than `threshold` words that the other side lacks.
/// Nothing here depends on word order, so "St Main 123" matches "123 Main St".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressFilter {
    pub threshold: usize,
    pub missing: MissingAddresses,
    pub customer_column: String,
    pub poi_column: String,
}

impl Default for AddressFilter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            missing: MissingAddresses::Keep,
            customer_column: crate::config::CUSTOMER_ADDRESS_COLUMN.to_string(),
            poi_column: crate::config::POI_ADDRESS_COLUMN.to_string(),
        }
    }
}

impl From<&FilterConfig> for AddressFilter {
    fn from(config: &FilterConfig) -> Self {
        Self {
            threshold: config.threshold,
            missing: config.missing_addresses,
            customer_column: config.customer_address_column.clone(),
            poi_column: config.poi_address_column.clone(),
        }
    }
}

impl AddressFilter {
    pub fn keep(&self, customer: Option<&str>, poi: Option<&str>) -> bool {
        let customer = AddressTokens::new(customer);
        let poi = AddressTokens::new(poi);

        if self.missing == MissingAddresses::Drop && customer.is_missing() && poi.is_missing() {
            return false;
        }

        let common = customer.common(&poi);
        customer.len().abs_diff(common) < self.threshold
            && poi.len().abs_diff(common) < self.threshold
    }

    pub fn mask(&self, table: &Table) -> Result<Vec<bool>> {
        let customer = table.require(&self.customer_column)?;
        let poi = table.require(&self.poi_column)?;
        Ok(table
            .rows
            .iter()
            .map(|row| self.keep(row[customer].as_deref(), row[poi].as_deref()))
            .collect())
    }

    /// Rows of `table` that pass, in their original order and otherwise untouched.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        table.filter_rows(&self.mask(table)?)
    }
}
