pub mod errors;
pub mod front;
pub mod hypervolume;
pub mod problem;
pub mod problems;
pub mod rng;
pub mod solution;

pub use errors::*;
pub use front::*;
pub use hypervolume::*;
pub use problem::*;
pub use problems::*;
pub use rng::*;
pub use solution::*;
