pub mod anonymous_voting;

pub use anonymous_voting::*;
