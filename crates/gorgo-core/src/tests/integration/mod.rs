#![cfg(test)]

pub mod application_tests;
pub mod plugin_tests;
