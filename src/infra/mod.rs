pub mod constants;
pub mod env;
pub mod logging;
