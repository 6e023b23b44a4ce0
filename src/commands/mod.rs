pub mod favorite;
pub mod generate;
pub mod list;
pub mod stats;
pub mod usage;

pub use favorite::*;
pub use generate::*;
pub use list::*;
pub use stats::*;
pub use usage::*;
