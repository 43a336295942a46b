//! Ticket Check Library
//!
//! The rule engine behind a cinema ticket-checking game: show scheduling,
//! ticket queues, accept/reject validation, and scoring.

pub mod simulation;
