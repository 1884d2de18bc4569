//! Conflict-path types consumed by the host scheduler.
//!
//! A [`StatePath`] names one shared-state location: a storage cell of some
//! contract (scoped by its address) identified by an ordered list of string
//! parts, e.g. `Balances/{owner}/{symbol}` under the token contract. The
//! planner declares, per pending operation, the set of paths the operation
//! will read and write; the scheduler runs two operations concurrently only
//! if neither's write set intersects the other's read or write set.
//!
//! Paths are ordered (`BTreeSet`) so declared sets are deterministic.

use dropvault_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A scoped state path: one named shared-state location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatePath {
    /// The contract whose storage this path lives in.
    pub address: Address,

    /// Ordered path segments within that contract's storage.
    pub parts: Vec<String>,
}

impl StatePath {
    /// Build a path from its scope address and segments.
    pub fn new<I, S>(address: Address, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            address,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.parts.join("/"))
    }
}

/// The declared read and write sets of one pending operation.
///
/// Declared paths must be a superset of every location the operation touches
/// when executed. Missing a touched location is a correctness bug; declaring
/// extra locations only costs parallelism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Locations the operation may read.
    pub read_paths: BTreeSet<StatePath>,

    /// Locations the operation may write.
    pub write_paths: BTreeSet<StatePath>,

    /// Conservative fallback: the operation must run alone.
    pub non_parallelizable: bool,
}

impl ResourceSet {
    /// An empty, parallelizable resource set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The conservative set for operations the planner does not model.
    pub fn non_parallelizable() -> Self {
        Self {
            non_parallelizable: true,
            ..Self::default()
        }
    }

    /// Declare a read path.
    pub fn read(&mut self, path: StatePath) {
        self.read_paths.insert(path);
    }

    /// Declare a write path.
    pub fn write(&mut self, path: StatePath) {
        self.write_paths.insert(path);
    }

    /// Check whether this operation may run concurrently with another.
    ///
    /// Two operations conflict if either is non-parallelizable or if one's
    /// write set intersects the other's read or write set.
    pub fn conflicts_with(&self, other: &ResourceSet) -> bool {
        if self.non_parallelizable || other.non_parallelizable {
            return true;
        }

        let writes_hit = |writes: &BTreeSet<StatePath>, other: &ResourceSet| {
            writes
                .iter()
                .any(|p| other.read_paths.contains(p) || other.write_paths.contains(p))
        };

        writes_hit(&self.write_paths, other) || writes_hit(&other.write_paths, self)
    }
}
