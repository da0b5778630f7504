//! Application layer: persistence, orchestration and the promotions service facade.

pub mod context;
pub mod database;
pub mod domain;
pub mod settings;

#[cfg(test)]
mod test;
