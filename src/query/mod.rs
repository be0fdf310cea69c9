pub mod enrich;
pub mod geo;
pub mod pagination;
pub mod predicate;
