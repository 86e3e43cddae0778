pub mod environment;
pub mod policy;
pub mod resource;
