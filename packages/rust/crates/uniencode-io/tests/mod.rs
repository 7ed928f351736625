//! Tests for uniencode-io crate.
//!
//! Integration tests for bounded reads, sniffing and atomic rewrites.

pub mod test_sniff;
