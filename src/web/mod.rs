mod error;
mod log;
pub mod midware;
pub mod routes;
pub mod types;

pub use error::{ClientError, Error, FieldError, WebResult};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
