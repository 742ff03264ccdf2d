pub mod client;
pub mod inverter;
pub mod types;

pub use client::{SolaxClient, SolaxSession};
pub use inverter::InverterModel;
