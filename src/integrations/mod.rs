pub mod torii;

pub use torii::{SqlQueryService, ToriiClient};
