pub mod bitreader;
pub mod bytevector;
pub mod error;
pub mod image;
pub mod logger;
pub mod writer;
