pub mod scope;
pub mod target;
