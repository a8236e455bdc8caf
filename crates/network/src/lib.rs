#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`NetworkError`)
//! - [`machine`]: Node state arena (`MachineStore`, `VulnerabilityBounds`, `NodeFilter`)
//! - [`topology`]: Graph with isolation mask (`Topology`, `TopologySpec`, `EntrySelection`)
//! - [`generator`]: Seeded topology generators

pub mod error;
pub mod generator;
pub mod machine;
pub mod topology;

// --- Public API Re-exports ---

pub use error::NetworkError;
pub use machine::{MachineStore, NodeFilter, VulnerabilityBounds};
pub use topology::{EntrySelection, Topology, TopologySpec};
