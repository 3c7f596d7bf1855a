pub mod classify;
pub mod device;
