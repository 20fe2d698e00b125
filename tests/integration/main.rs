//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and run whole
//! harvests end-to-end against them.

mod harvest_tests;
