//! Core input types: validated ports and lenient port/target parsers.
//!
//! Parsing here is best-effort. Malformed tokens are dropped rather than
//! reported as errors, and every parser exposes the dropped tokens through
//! [`Parsed`] for callers that want to surface them.

mod parsed;
mod port;
mod target;

pub use parsed::Parsed;
pub use port::{parse_ports, Port, PortList, PortPreset};
pub use target::{expand_cidr, expand_range, expand_targets, TargetKind, TargetList};
