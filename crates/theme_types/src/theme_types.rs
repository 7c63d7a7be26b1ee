//! Theme Types - Shared vocabulary for theme bindings
//!
//! This crate holds the pieces both sides of the system must agree on:
//! the resource value types pushed into bound fields, and the naming rule
//! that maps a declaring type onto its generated companion. The code
//! generator uses the naming rule to name what it emits and the runtime
//! resolver uses the very same rule to find it again.

pub mod naming;
mod values;

pub use values::*;
