mod page;
mod session;
mod stats;

pub use page::{PageBound, PageError, PageNumber};
pub use session::Session;
pub use stats::ProgressStats;
