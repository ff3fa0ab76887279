//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Adapters implement these traits to plug storage backends and models
//! into the analysis service.
//!
//! ```text
//!          ┌──────────────────────┐
//!          │  application::       │
//!          │  Detective           │
//!          └──────────┬───────────┘
//!                     │
//!          ┌──────────┴───────────┐
//!          ▼                      ▼
//!   ┌──────────────┐      ┌──────────────┐
//!   │ StateHistory │      │  Forecaster  │
//!   │  (sqlite)    │      │ (holt-winters│
//!   └──────────────┘      └──────────────┘
//! ```

pub mod outbound;
