#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod class;
mod group;

pub use self::{class::ClassResolver, group::GroupLoader};
