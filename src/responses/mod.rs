pub mod json;

pub use json::{error_to_response, json_response};
