pub mod product;
pub mod upload;
