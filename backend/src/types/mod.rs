mod environment;
mod error;
mod extractors;

pub use environment::Environment;
pub use error::{AppError, ErrorResponse, ResultExt};
pub use extractors::ValidatedJson;
