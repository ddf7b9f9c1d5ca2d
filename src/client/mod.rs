//! 远端层：Supadata 能力接口与实现（HTTP / Mock）

pub mod http;
pub mod mock;
pub mod traits;

pub use http::{HttpSupadataClient, DEFAULT_BASE_URL};
pub use mock::{MockCall, MockSupadataClient};
pub use traits::{JobHandle, JobKind, RemoteError, RemoteResult, SupadataClient};
