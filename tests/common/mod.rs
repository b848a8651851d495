//! Common test utilities for canvas-chat integration tests
//!
//! Resolver doubles that count or fail on demand, and builders for the
//! canvas shapes the tests share.

#![allow(dead_code)]

pub mod canvases;
pub mod resolvers;

pub use canvases::{chain, diamond, random_dag};
pub use resolvers::{CountingResolver, FailingResolver};
