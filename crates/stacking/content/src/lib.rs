//! Data-driven stacking configuration.
//!
//! Reads [`stacking_core::StackingConfig`] from the `[mob-stacking]` table of a
//! TOML file. Keys are kebab-case and every key is optional; missing keys keep
//! their defaults.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult};
