//! Rule-driven issue and pull request labeler.
//!
//! The `engine` module holds the pure decision and reconciliation
//! logic. Around it sit the thin collaborators: `config` (schema,
//! loading, validation), `context` (event payload parsing),
//! `conditions` (the condition vocabulary), and `github` (the REST
//! client that applies the computed operations).

pub mod conditions;
pub mod config;
pub mod context;
pub mod engine;
pub mod github;
