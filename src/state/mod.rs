//! Typed protocol state (spec §3 "State Entities (protocol state)").

mod config;
mod entities;

pub use config::Config;
pub use entities::{
    Beta, BlockInfo, Chi, CoreActivity, CoreAssignment, Delta, Eta, Gamma, Hash, Phi,
    PreimageEntry, Pi, Psi, Rho, SealKeys, ServiceAccount, ServiceActivity, Tau, TicketBody,
    Theta, Validator, ValidatorActivity, ValidatorSet, WorkReport, Xi,
};

/// The top-level state container owning every entity (spec §3: "All entities
/// are owned by the top-level state container").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    pub eta: Eta,
    pub tau: Tau,
    pub validators: ValidatorSet,
    pub gamma: Option<Gamma>,
    pub phi: Phi,
    pub rho: Rho,
    pub xi: Xi,
    pub psi: Psi,
    pub beta: Beta,
    pub chi: Chi,
    pub delta: Delta,
    pub pi: Pi,
    pub theta: Theta,
}
