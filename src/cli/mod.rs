pub mod caf;
pub mod command;
pub mod ogg;
