pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod guard;
pub mod humanize;
pub mod ledger;
pub mod observability;
pub mod orchestrator;
pub mod proto;
pub mod queue;
pub mod registry;
pub mod stages;
pub mod storage;
pub mod worker;
