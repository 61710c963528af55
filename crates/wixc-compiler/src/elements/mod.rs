//! Handlers for the core elements, one module per area of the language.

mod bundle;
mod chain;
mod component;
mod custom_action;
mod package;
mod payload;
mod product;
mod sequence;
mod variable;
mod wix;

#[cfg(test)]
mod chain_tests;
#[cfg(test)]
mod component_tests;
#[cfg(test)]
mod custom_action_tests;
#[cfg(test)]
mod package_tests;
#[cfg(test)]
mod wix_tests;

pub use variable::{MissingValue, infer_variable_type};
