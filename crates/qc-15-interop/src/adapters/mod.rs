//! # Adapters Module
//!
//! In-process implementations of every outbound port.

pub mod clock;
pub mod encryption;
pub mod ledger;
pub mod oracle_fetcher;
pub mod validator;

pub use clock::{ManualClock, SystemClock};
pub use encryption::XChaChaSealer;
pub use ledger::InMemoryLedger;
pub use oracle_fetcher::StaticOracleFetcher;
pub use validator::{MemberBehavior, ThresholdValidatorSet};
