//! Key provisioning for Keygate.
//!
//! This module contains the provisioning pipeline:
//! - Key: submission decoding and newline normalization
//! - Filesystem: the file operations the provisioner depends on
//! - Provisioner: environment checks, trust store append, tracking files

mod fs;
mod key;
mod provisioner;

pub use fs::*;
pub use key::*;
pub use provisioner::*;
