mod error;
pub use error::{AppError, ErrorKind};

mod env;
pub use env::{APP_CONFIG, AppConfig};

mod fact_type;
pub use fact_type::{EdgeSource, EdgeType, ExtractionMethod, FactType};
