//! Adapter over the `fake` crate: the locale-aware source of names,
//! addresses and other realistic text.

pub mod adapter;
pub mod locales;

pub use adapter::{FakeRsAdapter, FakerKind};
pub use locales::LocaleKey;
