pub mod criteria;
pub mod facility;
pub mod status;
