//! Record module for normalized book data
//!
//! This module turns raw parsed page fields into the records the dataset is
//! made of.
//!
//! # Components
//!
//! - `BookRecord`: One fully validated book, in CSV column order
//! - `StockQuantity`: Stated count or explicitly unknown, never conflated
//! - `normalize`: The listing + detail merge with all field validation

mod book;
mod normalize;

// Re-export main types
pub use book::{BookRecord, StockQuantity};
pub use normalize::normalize;
