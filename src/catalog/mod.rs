//! AppliesTo function and operator catalog.
//!
//! This module provides:
//! - `FunctionDescriptor` and `OperatorDescriptor`, the records completion works over
//! - The built-in catalog, loaded from embedded data
//! - `FunctionNamespace`, the merge of built-in and user-defined functions

mod builtins;
mod function;
mod namespace;
mod operator;

pub use builtins::{builtin_functions, get_builtin, get_operator, operators};
pub use function::{FunctionDescriptor, Provenance};
pub use namespace::{CustomFunction, FunctionNamespace};
pub use operator::{OperatorCategory, OperatorDescriptor};
