//! Static conflict-path planning for voucher operations.
//!
//! Before scheduling, the host asks the planner which shared-state locations
//! a pending operation will read and write. The scheduler then runs two
//! operations concurrently only if their declared sets do not conflict.
//! Declared paths must be a superset of actual accesses; operations the
//! planner does not model fall back to non-parallelizable.
//!
//! Only batch creation and claim settlement are modeled. They are the hot
//! paths, and crucially their balance writes land on distinct derived escrow
//! subaccounts and distinct receivers, so independent batches parallelize.

mod fees;
mod planner;

pub use fees::{
    BALANCES_PATH, FREE_ALLOWANCES_PATH, FREE_ALLOWANCE_CONFIG_PATH, FREE_ALLOWANCE_REFRESH_PATH,
};
pub use planner::ConflictPlanner;
