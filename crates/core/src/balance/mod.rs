//! Account balance maintenance: incremental deltas and full replay.

pub mod projector;

#[cfg(test)]
mod projector_props;

pub use projector::{BalanceProjector, RecalculationSummary};
