mod address;
mod table;

pub use address::{AddressTokens, MISSING_ADDRESS};
pub use table::Table;
