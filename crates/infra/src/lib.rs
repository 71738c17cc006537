//! Infrastructure layer: persistence mapping, outbox encoding, atomic commit,
//! read model, use-case interactors and configuration.

pub mod commit;
pub mod config;
pub mod outbox;
pub mod read_model;
pub mod repository;
pub mod usecases;

#[cfg(test)]
mod integration_tests;
