//! Tests for token issuance and verification
