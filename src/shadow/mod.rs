//! Device-shadow wire contract.
//!
//! Topic strings and JSON document shapes exchanged with the broker. The
//! topic set is closed and known at build time, so inbound routing is an
//! enum match rather than open-ended string comparison.

pub mod document;
pub mod topics;
