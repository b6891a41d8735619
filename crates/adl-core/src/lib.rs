pub mod config;
pub mod logging;

pub mod attribution;
pub mod checksum;
pub mod collision;
pub mod destination;
pub mod expand;
pub mod fetch;
pub mod payload;
pub mod pipeline;
pub mod scratch;
pub mod trigger;
