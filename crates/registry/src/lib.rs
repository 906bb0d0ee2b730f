//! Maritime entity registry (clusters, ports, terminals, operators).
//!
//! This crate contains the canonical records the dashboard serves and the
//! review gate through which AI-drafted research may be promoted into them,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod cluster;
pub mod drafts;
pub mod operator;
pub mod port;
pub mod review;
pub mod terminal;

pub use cluster::{ClusterId, PortCluster};
pub use drafts::ResearchDrafts;
pub use operator::{OperatorId, TerminalOperator};
pub use port::{Port, PortId};
pub use review::{OperatorReview, PortReview, TerminalReview};
pub use terminal::{Terminal, TerminalId, TerminalType};
