//! CandleScreen Core: domain types, market data, indicators, screening pipeline.
//!
//! This crate contains the heart of the screener:
//! - Domain types (bars, signals, volume status, result records)
//! - Market data providers (Yahoo intraday, synthetic) and the universe
//! - The baseline moving average
//! - Resampling, baseline windows, signal and volume classification, ranking
//!
//! Everything here is synchronous and free of shared state apart from the
//! Yahoo provider's circuit breaker; the runner owns scheduling.

pub mod data;
pub mod domain;
pub mod indicators;
pub mod screen;
