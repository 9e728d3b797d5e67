//! Resilient VQA client.
//!
//! Keep the public surface small and predictable: build a [`VqaClient`] from a
//! [`ClientConfig`](crate::config::ClientConfig), call [`VqaClient::query`],
//! and [`VqaClient::close`] on shutdown. Implementation details are split into
//! submodules under `src/client/`.

pub mod builder;
pub mod core;
mod policy;
pub mod shared;

pub use builder::VqaClientBuilder;
pub use core::VqaClient;
pub use policy::RetryPolicy;
pub use shared::SharedVqaClient;
