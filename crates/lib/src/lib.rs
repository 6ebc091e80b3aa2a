//! brooklyn-lib: blueprint resolution and service provisioning for `cf push`.
//!
//! Manifests may describe services inline, either as blueprints or as
//! references to broker offerings. This crate turns those descriptions into
//! catalog items and service instances, waits for them to start, and rewrites
//! the manifest to plain service names before deploying.
//!
//! - `manifest`: order-preserving document tree and file I/O
//! - `classify`: what kind of service entry a manifest node is
//! - `catalog`: catalog item documents for inline blueprints
//! - `push`: the end-to-end push flow
//! - `ready`: waiting for created services
//! - `gateway`: the platform CLI and the broker REST API

pub mod catalog;
pub mod classify;
pub mod config;
pub mod consts;
pub mod credentials;
pub mod gateway;
pub mod inspect;
pub mod manifest;
pub mod platform;
pub mod push;
pub mod ready;
pub mod util;
