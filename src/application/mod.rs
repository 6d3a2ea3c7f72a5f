// Application layer - Tick pipeline and panel rendering
pub mod assembler;
pub mod monitor_service;
pub mod panels;
pub mod series_source;

#[cfg(test)]
pub mod fake_source;
