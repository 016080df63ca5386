//! Contract bindings for the OP Stack withdrawal contracts.
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod opstack;
