pub mod layout;
pub mod queue;
