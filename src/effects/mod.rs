pub mod composite;
pub mod pattern;
