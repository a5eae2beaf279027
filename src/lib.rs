//! Aula is a self-hosted course platform backend: cached catalog reads,
//! per-lecture Q&A and reviews, orders with enrollment, notifications,
//! and admin analytics over a PostgreSQL document store.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
