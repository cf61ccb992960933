//! Transport layer: configuration, stream establishment and buffering.

mod byte_stream;
mod config;
mod stream;

pub use byte_stream::ByteStream;
pub use config::{Config, ConfigBuilder};
pub use stream::{connect, ImapStream};
