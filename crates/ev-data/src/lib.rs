pub mod cache;
pub mod config_file;
pub mod fronts;
pub mod weights;

pub use cache::*;
pub use config_file::*;
pub use fronts::*;
pub use weights::*;
