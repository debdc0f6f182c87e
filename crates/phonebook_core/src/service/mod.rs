//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into phonebook use-cases.
//! - Keep CLI callers decoupled from storage details.

pub mod phonebook_service;
