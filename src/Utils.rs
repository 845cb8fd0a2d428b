//! different utility modules used throughout the project
/// terminal logger set up from a loglevel string
pub mod logger;
