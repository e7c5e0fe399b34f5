//! Public-site page behaviour for the CMS.
//!
//! Controllers for the back-to-top button, navbar and mobile menu, article
//! favorite/copy-link buttons, search box and newsletter signup forms. They
//! talk to the page through the [`dom::Dom`] and [`host::Host`] traits, so
//! the same code runs in the browser (`web` feature), in tests and in the
//! template checker.

pub mod check;
pub mod config;
pub mod controllers;
pub mod dom;
pub mod error;
pub mod fingerprint;
pub mod host;
pub mod page;
pub mod toast;
pub mod toggle;
pub mod transport;

#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use config::UiConfig;
pub use error::{TransportError, UiError};
pub use page::{Dispatch, Page, PageEvent};
