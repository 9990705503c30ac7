//! Purpose: Library crate behind the `novelfetch` CLI and its tests.
//! Exports: `api` (instrumented client, domain APIs), `debug` (sink contract and sinks).
//! Role: Client-side helpers for the novel/series download backend.
//! Invariants: Debug sinks observe requests but never alter their outcomes.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod debug;
