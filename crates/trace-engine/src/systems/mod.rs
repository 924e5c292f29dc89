pub mod drag;
pub mod feedback;
pub mod generator;
pub mod lifecycle;
pub mod scorer;
