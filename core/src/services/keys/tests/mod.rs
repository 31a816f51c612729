//! Tests for key storage and the key registry

mod registry_tests;
