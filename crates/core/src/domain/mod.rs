pub mod client;
pub mod follow_up;
pub mod plan;
pub mod proposal;
pub mod quote;
pub mod segment;
