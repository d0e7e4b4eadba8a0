pub mod logging;
pub mod response;
pub mod time;
