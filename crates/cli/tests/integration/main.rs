//! CLI integration tests against a scripted `cf` binary.

#![cfg(unix)]

mod common;
mod inspect_tests;
mod push_tests;
