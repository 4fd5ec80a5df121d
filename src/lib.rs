//! Core library for the sheet-dashboard command line application.
//!
//! Data flows in one direction: [`ingest`] turns the rows of a remote sheet
//! into records, [`view`] derives a searchable and sortable working view from
//! them, and [`export`] writes that view into a freshly created spreadsheet.
//! Store adapters live under [`io`], shared data types in [`model`], and
//! [`session`] owns the mutable state a front-end drives through intents.

pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod io;
pub mod model;
pub mod session;
pub mod view;

pub use error::{Result, SheetError};
