//! Page model of the configuration UI.
//!
//! Every visual element is plain state that renders to an HTML fragment; timers for
//! animations and auto-close go through [`crate::scheduler::Scheduler`].

pub mod banner;
pub mod context_menu;
pub mod html;
pub mod loading;
pub mod modal;
pub mod navigation;
pub mod page;
pub mod popup;
pub mod progress;

pub use banner::{Banner, BannerId, BannerKind, BannerStack};
pub use page::{Page, PageHandle};
pub use popup::{Popup, PopupButton};
pub use progress::{ProgressBar, gradient};
