pub mod error;
pub mod normalize;

pub use error::AppError;
