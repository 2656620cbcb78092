use std::collections::HashSet;

/// What a null address stringifies to before tokenising. Two missing
/// addresses therefore share one token and agree with each other.
pub const MISSING_ADDRESS: &str = "nan";

/// The lower-cased, whitespace-separated words of a street address, as a set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressTokens {
    tokens: HashSet<String>,
    missing: bool,
}

impl AddressTokens {
    pub fn new(address: Option<&str>) -> Self {
        let missing = address.map_or(true, |x| x.trim().is_empty());
        let tokens = address
            .unwrap_or(MISSING_ADDRESS)
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self { tokens, missing }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True for null or blank input.
    pub fn is_missing(&self) -> bool {
        self.missing
    }

    pub fn common(&self, other: &Self) -> usize {
        self.tokens.intersection(&other.tokens).count()
    }
}
