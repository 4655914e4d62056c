//! Subcommands of the `simdyna` binary.

pub mod export;
pub mod inspect;
pub mod train;
