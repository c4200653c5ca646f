#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use image_rewrite_core as core;

mod admission;
mod args;
pub mod config;
mod metrics;

pub use self::{admission::Admission, args::Args, metrics::AdmissionMetrics};
