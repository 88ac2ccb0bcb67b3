pub mod controller;
pub mod state;

pub use controller::SyncController;
pub use state::{CheckOutcome, CycleReport, KindOutcome, Operation, SyncState};
