pub mod amount;
pub mod model;

pub use amount::{Amount, AmountError};
