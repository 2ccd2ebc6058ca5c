pub mod config;
pub mod product;
pub mod storage;

pub use product::{DEFAULT_CATEGORY, Product, ProductId};
