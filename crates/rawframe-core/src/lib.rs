pub mod aligned;
pub mod attributes;
pub mod config;
pub mod consts;
pub mod control;
pub mod error;
pub mod frame;
pub mod header;
pub mod mode;
pub mod writer;
