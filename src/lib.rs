pub mod catalog;
pub mod config;
pub mod conformance;
pub mod error;
pub mod logging;
pub mod output;
pub mod regatta;
pub mod scoring;
