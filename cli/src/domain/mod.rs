//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod backoff;
pub mod catalog;
pub mod config;
pub mod error;
pub mod phase;
pub mod target;

pub use backoff::Backoff;
pub use config::{ChannelConfig, CustomTarget, RunConfig, TargetOverride};
pub use error::{
    AcquireFailure, ChannelError, ConfigError, ExtractionError, MintError, MintStep, TimeoutError,
    VerificationError,
};
pub use phase::Phase;
pub use target::{
    AuthScheme, FileReadSpec, Handshake, PollPolicy, Probe, ServiceTarget, TokenMinter,
    VerifyProbe,
};
