//! Unit tests for the research task module.
