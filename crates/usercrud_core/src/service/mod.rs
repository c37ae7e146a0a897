//! Use-case services over the repository layer.
//!
//! # Responsibility
//! - Keep the console front end decoupled from storage details and errors.

pub mod user_dao;
