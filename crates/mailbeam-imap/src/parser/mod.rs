//! Server response parsing: lexer primitives and the response grammar.

pub mod lexer;
mod response;
mod types;

pub use response::read_response;
pub use types::{DataResponse, Response, ResponseText, StatusKind, StatusResponse};
