//! # Data Transfer Objects
//!
//! ユースケースへの入力

pub mod connection_options;
