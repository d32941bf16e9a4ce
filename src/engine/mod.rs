//! Engine module for the harvesting core: filter, harvester, walker, driver.

pub mod context;
pub mod driver;
pub mod filter;
pub mod handlers;
pub mod harvester;
pub mod walker;

// Re-export commonly used functions
pub use context::HarvestContext;
pub use driver::{Clock, Driver, DriverState, StepOutcome, SystemClock, format_status};
pub use filter::{accepts, meets_criteria};
pub use handlers::handle_run;
pub use harvester::{collect_timeline, harvest_posts};
pub use walker::walk;
