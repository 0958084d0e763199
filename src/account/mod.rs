pub mod lifecycle;
pub mod outcome;
pub mod resolver;
