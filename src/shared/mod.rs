pub mod clock;
pub mod errors;
pub mod pagination;
pub mod retry;
pub mod shutdown;

pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use errors::DomainError;
pub use pagination::{PageRequest, PaginatedResult};
pub use retry::{retry_with_backoff, RetryConfig};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
