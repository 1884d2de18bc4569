//! Engine configuration.
//!
//! The two policy axes exist because deployed variants of this product
//! disagree on both behaviors. Neither choice is hardcoded; deployments pick
//! explicitly.

/// How a claim entry whose receiver already claimed is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Skip the entry silently: no state change, no event, the remaining
    /// entries still settle.
    #[default]
    Skip,

    /// Abort the entire claim call with a receiver-already-received error.
    Reject,
}

/// How an invalid claim signature inside a multi-entry call is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimSignaturePolicy {
    /// Any invalid signature aborts the entire call. A strict call must also
    /// settle at least one entry.
    #[default]
    Strict,

    /// An invalid signature emits a failed-claim event for that entry and
    /// the remaining entries still settle.
    Lenient,
}

/// Configuration for the voucher engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Duplicate-receiver handling.
    pub duplicate_policy: DuplicatePolicy,

    /// Invalid-claim-signature handling.
    pub signature_policy: ClaimSignaturePolicy,

    /// Delegated-operator variant: when set, only the admin and registered
    /// controllers may execute claim settlement.
    pub restrict_claims_to_controllers: bool,
}

impl EngineConfig {
    /// Strict signature checking with silent duplicate skipping (the
    /// quick-transfer variant's behavior).
    pub fn strict() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Skip,
            signature_policy: ClaimSignaturePolicy::Strict,
            ..Default::default()
        }
    }

    /// Lenient signature handling with duplicate rejection.
    pub fn lenient() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            signature_policy: ClaimSignaturePolicy::Lenient,
            ..Default::default()
        }
    }

    /// Restrict claim settlement to the admin and registered controllers.
    pub fn with_controller_gate(mut self) -> Self {
        self.restrict_claims_to_controllers = true;
        self
    }
}
