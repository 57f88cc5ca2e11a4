//! Report module - terminal tables, charts and JSON export

pub mod charts;
pub mod coefficients;
pub mod export;
pub mod summary;
pub mod tables;

pub use charts::render_all;
pub use coefficients::*;
pub use export::*;
pub use summary::*;
pub use tables::*;
