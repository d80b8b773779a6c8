//! Unit test modules.

mod adaptation_test;
mod analytics_test;
mod parameters_test;
