//! On-disk document package codec.
//!
//! A package file carries the ordered block list and a relationship table
//! (attachment id → typed payload) side by side, so a reader can diff
//! attachments without decoding every block.

mod json;

pub use json::JsonPackage;
