pub mod answer;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod logger;

pub use answer::*;
pub use context::*;
pub use dispatcher::*;
pub use error::*;
pub use extractor::*;
pub use handler::*;
