// Domain layer - Core pipeline types and rules

pub mod model;
pub mod rules;
