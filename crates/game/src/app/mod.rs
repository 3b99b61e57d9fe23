pub(crate) mod bootstrap;
pub(crate) mod config;
pub(crate) mod driver;
pub(crate) mod loop_runner;
