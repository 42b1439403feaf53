#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use alb_admission_core as core;
pub use alb_admission_k8s_api as k8s;

mod admission;
mod args;
mod metrics;

pub use self::args::Args;
