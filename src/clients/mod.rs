//! Remote task service clients.
//!
//! [`RemoteTaskService`] is the capability seam: the real HTTP client and the
//! offline mock are interchangeable behind it, so nothing above this layer
//! knows which one it is talking to.

pub mod edusp_client;
pub mod mock_client;
pub mod remote;

pub use edusp_client::EduspClient;
pub use mock_client::MockClient;
pub use remote::RemoteTaskService;
