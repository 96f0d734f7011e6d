//! # Base types for rookery
//!
//! This is an auxiliary crate for `rookery`, which contains the coordinate system and the
//! closed value types the rules engine is built from. Everything here is plain data with
//! no knowledge of chess rules beyond geometry.
//!
//! Normally you don't want to use this crate directly. Use `rookery` instead, which
//! re-exports everything declared here.

pub mod bitboard;
pub mod geometry;
pub mod types;
