//! Typed protocol state entities (spec §3 "State Entities").

use std::collections::BTreeMap;

pub type Hash = [u8; 32];

/// **Eta (η):** fixed 4-entry array of entropy values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Eta(pub [Hash; 4]);

impl Default for Eta {
    fn default() -> Self {
        Eta([[0u8; 32]; 4])
    }
}

/// **Tau (τ):** the current timeslot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tau(pub u32);

/// One entry of a [`ValidatorSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validator {
    pub bandersnatch: [u8; 32],
    pub ed25519: [u8; 32],
    pub bls: [u8; 144],
    pub metadata: [u8; 128],
}

impl Default for Validator {
    fn default() -> Self {
        Validator {
            bandersnatch: [0; 32],
            ed25519: [0; 32],
            bls: [0; 144],
            metadata: [0; 128],
        }
    }
}

/// **ValidatorSet:** fixed-length vector of validator records, size known
/// from [`Config::validator_count`](super::Config).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidatorSet(pub Vec<Validator>);

/// A ticket entry, used both in [`Gamma::seal`] (tickets variant) and in
/// [`Gamma::accumulator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TicketBody {
    pub id: Hash,
    pub attempt: u8,
}

/// The tagged union `Gamma.s`: either an ordered ticket sequence (tag 0) or a
/// fallback key sequence (tag 1).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SealKeys {
    Tickets(Vec<TicketBody>),
    Keys(Vec<[u8; 32]>),
}

/// **Gamma (γ):** the current safrole stage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gamma {
    pub validators: ValidatorSet,
    pub vrf_root: [u8; 144],
    pub seal: SealKeys,
    pub accumulator: Vec<TicketBody>,
}

/// **Phi (φ):** per-core FIFO queue of authorizer hashes, up to `Q` entries;
/// zero hashes are skipped on decode (absent entries).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Phi(pub Vec<Vec<Hash>>);

/// A work report as referenced from [`Rho`] and [`BlockInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkReport {
    pub hash: Hash,
    pub exports_root: Hash,
}

/// A single core's pending assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreAssignment {
    pub hash: Hash,
    pub work_report: WorkReport,
    pub timeslot: u32,
}

/// **Rho (ρ):** per-core optional pending assignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rho(pub Vec<Option<CoreAssignment>>);

/// **Xi (ξ):** sliding window of per-slot work-package hash sets, plus a
/// union index across the whole window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Xi {
    pub slots: Vec<Vec<Hash>>,
    pub union: std::collections::BTreeSet<Hash>,
}

/// **Psi (ψ):** the four judgement hash sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Psi {
    pub good: Vec<Hash>,
    pub bad: Vec<Hash>,
    pub wonky: Vec<Hash>,
    pub punish: Vec<[u8; 32]>,
}

/// One block's worth of recorded chain history (spec §4.6 Beta).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockInfo {
    pub header_hash: Hash,
    pub beefy_root: Hash,
    pub state_root: Hash,
    pub work_reports: Vec<WorkReport>,
}

/// **Beta (β):** bounded-length (cap 8) recent block history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Beta(pub Vec<BlockInfo>);

impl Beta {
    pub const CAPACITY: usize = 8;
}

/// **Chi (χ):** privileged service assignments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chi {
    pub manager: Option<u32>,
    pub assign: Vec<u32>,
    pub designate: Option<u32>,
    pub always_accumulate: BTreeMap<u32, u64>,
}

/// A preimage's recorded lookup timestamps (up to 3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreimageEntry {
    pub timestamps: Vec<u32>,
}

/// One entry of [`Delta`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceAccount {
    pub code_hash: Hash,
    pub balance: u64,
    pub min_item_gas: u64,
    pub min_memo_gas: u64,
    pub storage_footprint: u64,
    pub created_at: u32,
    pub last_accumulation: u32,
    pub parent_service: Option<u32>,
    pub preimages: BTreeMap<Hash, PreimageEntry>,
}

/// **Delta (δ):** `service_id -> ServiceAccount`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delta(pub BTreeMap<u32, ServiceAccount>);

/// Per-validator activity counters for one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidatorActivity {
    pub blocks: u32,
    pub tickets: u32,
    pub pre_images: u32,
    pub pre_images_size: u32,
    pub guarantees: u32,
    pub assurances: u32,
}

/// Per-core activity counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreActivity {
    pub da_load: u32,
    pub popularity: u32,
    pub imports: u32,
    pub exports: u32,
    pub extrinsic_size: u32,
    pub extrinsic_count: u32,
    pub bundle_size: u32,
    pub gas_used: u64,
}

/// Per-service activity counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceActivity {
    pub provided_count: u32,
    pub provided_size: u32,
    pub refinement_count: u32,
    pub refinement_gas_used: u64,
    pub imports: u32,
    pub exports: u32,
    pub extrinsic_size: u32,
    pub extrinsic_count: u32,
    pub accumulate_count: u32,
    pub accumulate_gas_used: u64,
    pub on_transfers_count: u32,
    pub on_transfers_gas_used: u64,
}

/// **Pi (π):** validator, core, and service activity statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pi {
    pub current_epoch: Vec<ValidatorActivity>,
    pub previous_epoch: Vec<ValidatorActivity>,
    pub cores: Vec<CoreActivity>,
    pub services: BTreeMap<u32, ServiceActivity>,
}

/// **Theta (θ):** sequence of accumulation outputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Theta(pub Vec<(u32, Hash)>);
