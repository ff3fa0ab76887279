//! Application services (use cases).
//!
//! These services coordinate the storage port with the domain transforms.

pub mod detective;

pub use detective::Detective;
