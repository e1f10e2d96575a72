//! Core types: diagnostic log store, URL sanitizing, tracing setup

pub mod links;
pub mod logs;
pub mod tracing;

pub use links::{CallbackSource, sanitize_url};
pub use logs::{LogObserver, LogSnapshot, LogStore, Subscription, format_line};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
