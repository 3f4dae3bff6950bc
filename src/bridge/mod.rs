pub mod client;
pub mod hue;
pub mod session;
pub mod translate;
