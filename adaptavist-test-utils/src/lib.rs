//! Fixtures shared by the tests of the adaptavist crates
//!
//! - [`EnvVarGuard`] serialises and restores environment changes
//! - [`NetrcGuard`] provides a temporary home with a `.netrc`
//! - [`MockJira`] is a mock Jira server usable from blocking code
//!
//! Not every test binary uses every fixture, hence the crate-wide
//! `dead_code` allowance.

#![allow(dead_code)]

pub mod env;
pub mod mock;
pub mod netrc;

pub use env::EnvVarGuard;
pub use mock::MockJira;
pub use netrc::NetrcGuard;
