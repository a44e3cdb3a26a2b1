//! Aidge Core
//!
//! Core types shared by the Aidge task client, orchestrator and CLI.
//!
//! This crate contains:
//! - Domain types: task specifications, outcomes and batch records
//! - DTOs: request/response shapes exchanged with the HTTP API

pub mod domain;
pub mod dto;
