//! Generic Kubernetes resource access for test workloads.
//!
//! The crate lets a test script manipulate arbitrary resource kinds and
//! block until a resource reaches an observable condition:
//!
//! - [`locator`] resolves a kind name to its API coordinates and scope,
//!   from a static table or from live API discovery.
//! - [`resources::GenericClient`] performs create/get/list/delete/update
//!   and server-side apply over loosely-typed documents.
//! - [`resources::Structured`] exchanges statically-typed `k8s-openapi`
//!   objects instead of documents.
//! - [`wait`] polls a resource until a predicate is satisfied, fails, or
//!   the timeout expires; [`helpers::Helpers`] packages the common waits
//!   (pod running, job completed, service ready, external address).
//!
//! The wire protocol lives behind the [`transport::Transport`] trait:
//! [`transport::KubeTransport`] adapts an authenticated `kube::Client`,
//! and [`transport::FakeTransport`] is an in-memory double for tests.

pub mod error;
pub mod helpers;
pub mod locator;
pub mod resources;
pub mod transport;
pub mod utils;
pub mod wait;

pub use error::{Error, Result};
pub use helpers::Helpers;
pub use locator::{DiscoveryLocator, KindLocator, ResourceMapping, ResourceScope, StaticLocator};
pub use resources::{GenericClient, Structured, FIELD_MANAGER};
pub use transport::{FakeTransport, KubeTransport, Transport};
pub use utils::document::{GenericDocument, DEFAULT_NAMESPACE};
pub use utils::retry::retry;
pub use wait::{wait_for, wait_value, WaitOptions};
