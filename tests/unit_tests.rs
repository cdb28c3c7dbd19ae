//! Component-level tests: errors, configuration, builders, runtime adapters.

mod unit;
