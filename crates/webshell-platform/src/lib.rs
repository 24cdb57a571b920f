//! Platform collaborators for WebShell.
//!
//! The shell never talks to a real web engine or OS facility directly; it
//! goes through the traits in [`services`]. This crate also ships the
//! desktop implementation, a scoped hardware-back dispatcher, and an
//! in-memory browser used for headless runs and tests.

pub mod back;
pub mod headless;
pub mod services;

pub use back::{BackHandler, BackSubscription};
pub use headless::HeadlessBrowser;
pub use services::{AlertPresenter, BackButtonSource, DesktopPlatform, EmbeddedBrowser, UrlOpener};
