//! Theme Codegen - Build-time generation of theme binding companions
//!
//! The pipeline has three stages:
//!
//! 1. A structural description of a declaring type ([`TypeDescription`]),
//!    read from a manifest or lifted from a `syn::DeriveInput`.
//! 2. The declaration model ([`DeclaringType`]): only the annotated fields,
//!    classified by shape and resource kind.
//! 3. The synthesizer, which turns a model into the companion's tokens, and
//!    the [`Emitter`], which writes one source file per companion.
//!
//! The `theme_macros` derive runs stages 1–3 in-process; the `themegen`
//! binary runs them over a manifest and writes files.

mod description;
mod emit;
mod model;
pub mod syntax;
mod synth;

pub use description::*;
pub use emit::*;
pub use model::*;
pub use synth::*;
