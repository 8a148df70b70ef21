pub mod assignment;
pub mod roster;
