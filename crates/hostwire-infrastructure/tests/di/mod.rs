//! DI container tests

mod provider_test;
