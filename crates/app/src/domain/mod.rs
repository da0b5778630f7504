pub mod orders;
pub mod promos;
