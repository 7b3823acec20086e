//! Tests for account service

#[cfg(test)]
mod property_tests;
