//! Domain types for the pilar data model.

mod amount;
mod goal;
mod pillar;
mod profile;
mod transaction;

pub use amount::{Amount, AmountError};
pub use goal::Goal;
pub use pillar::Pillar;
pub use profile::Profile;
pub use transaction::{Transaction, TransactionFilter};
