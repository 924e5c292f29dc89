pub mod path;
pub mod rng;
pub mod timer;
