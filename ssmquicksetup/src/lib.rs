pub mod addr;
pub mod config;
pub mod connector;
pub mod op;
pub mod op_impl;
pub mod resource;
pub mod status;
pub mod tags;
