//! Test Module
//!
//! Cross-module test suite for the rxscan core.
//!
//! ## Test Categories
//! - `extraction_tests`: output shape, routing, vitals and recognizer failure
//! - `config_tests`: environment-driven configuration
//! - `text_extract_tests`: file and document input

pub mod text_extract_tests;
