//! Roster Accrual & Approval Engine
//!
//! This crate tracks daily attendance codes per employee, derives earned rest
//! days and leave balances from them, enforces the leave rules before any
//! change is committed, routes changes through a draft → pending → approved
//! lifecycle and keeps a field-level audit trail. [`service::RosterService`]
//! is the entry point; the other modules are the pure rules it composes.

#![warn(missing_docs)]

pub mod audit;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod service;
pub mod workflow;
