// Domain layer - Core value types and rules

pub mod model;
pub mod rules;
