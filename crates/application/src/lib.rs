//! Custos application layer: ports, the decision engine, and use cases.

pub mod decision;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use decision::{ConnectRequest, Decision, DecisionEngine};
