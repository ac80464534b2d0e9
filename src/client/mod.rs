pub mod api;
pub mod gate;
pub mod retry;
pub mod transport;

pub use api::{Api, WaypointFilter};
pub use gate::Gate;
pub use retry::{Decision, RetryPolicy};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport, Verb};
