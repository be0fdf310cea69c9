pub mod controller;
pub mod http;
pub mod markers;
pub mod window;
