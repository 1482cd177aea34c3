//! Typed wrappers around the generic [`ResourceClient`](resource_actor::ResourceClient)s.
//!
//! Each client turns [`FrameworkError`](resource_actor::FrameworkError) back into its
//! resource's own error type and adds the domain operations callers actually use.

pub mod order_client;
pub mod product_client;
pub mod user_client;

pub use order_client::OrderClient;
pub use product_client::ProductClient;
pub use user_client::{UserClient, UserDirectory};
