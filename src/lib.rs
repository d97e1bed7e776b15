//! Pedestrian-count explorer core.
//!
//! Turns raw per-interval pedestrian counts for the Bahnhofstrasse counters
//! into a small, sorted, labeled tidy series for charting, filtered by
//! location, month range, demographic group and weather.
//!
//! Module structure:
//! - `model` - shared types and errors
//! - `locations`, `weather` - registries of known ids
//! - `filter` - the `FilterSpec` value object
//! - `aggregate`, `granularity`, `series`, `labels` - the transform stages
//! - `pipeline` - the stages chained, plus the stale-request guard
//! - `focus` - monthly children/adults shares
//! - `source` - record sources (HTTP backend, in-memory)
//! - `config`, `logging` - ambient setup

pub mod aggregate;
pub mod config;
pub mod filter;
pub mod focus;
pub mod granularity;
pub mod labels;
pub mod locations;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod series;
pub mod source;
pub mod weather;

pub use filter::{FilterSpec, GroupSelector, LocationSelector};
pub use granularity::{select_mode, Granularity};
pub use model::{Group, RawRecord, TidyPoint, YearMonth};
pub use pipeline::{run, PipelineOptions, RequestTracker, Series};
