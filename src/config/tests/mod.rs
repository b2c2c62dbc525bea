//! Unit tests for the configuration cache and settings views.
