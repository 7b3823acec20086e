//! Tests for the email module

mod mailer_tests;
