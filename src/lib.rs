//! A safe Rust crate for inspecting X11 selections.
//!
//! This crate answers two questions about an X11 selection (`CLIPBOARD`, `PRIMARY` and so on):
//! which window currently owns it, and which targets (data formats) the owner is willing to
//! convert it to. It does not paste or copy anything; it is meant for diagnostic tools, see
//! `x11-selection-rs-tools` for an interactive inspector built on top of it.
//!
//! All operations take the connection to the X server explicitly as a [`Session`]. The
//! [`X11Session`] implementation talks to a real server through `x11rb`; tests and other
//! embedders can provide their own.
//!
//! # Examples
//!
//! Printing the owner of the clipboard:
//! ```no_run
//! # extern crate x11_selection_rs;
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! use x11_selection_rs::{inspect::get_owner, Selection, X11Session};
//!
//! let session = X11Session::connect(None)?;
//! match get_owner(&session, &Selection::Clipboard)? {
//!     Some(window) => println!("Owned by window {}", window),
//!     None => println!("Nobody owns the clipboard"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Listing the targets offered for the primary selection:
//! ```no_run
//! # extern crate x11_selection_rs;
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use x11_selection_rs::{inspect::{get_targets, Options, Status}, Selection, X11Session};
//!
//! let session = X11Session::connect(None)?;
//! let mut options = Options::new();
//! options.timeout(Some(Duration::from_secs(1)));
//!
//! let result = get_targets(&session, &Selection::Primary, &options)?;
//! match result.status {
//!     Status::Declined => println!("The owner refused to list its targets"),
//!     Status::TimedOut => println!("The owner did not answer"),
//!     _ => {
//!         for target in &result.targets {
//!             println!("{}", target);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/x11-selection-rs/0.1.0")]
#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

mod common;
mod x11;

#[cfg(test)]
mod tests;

pub mod inspect;
pub mod session;
pub mod utils;

pub use common::{Error, SetupError};
pub use session::Session;
pub use x11::X11Session;

/// The selection to operate on.
#[derive(Clone, Eq, PartialEq, Debug, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Selection {
    /// The `CLIPBOARD` selection, used for explicit copy and paste.
    #[default]
    Clipboard,
    /// The `PRIMARY` selection, set by selecting text.
    Primary,
    /// The rarely used `SECONDARY` selection.
    Secondary,
    /// Any other selection, by its atom name.
    Named(String),
}

impl Selection {
    /// Returns the atom name of this selection.
    pub fn name(&self) -> &str {
        match self {
            Selection::Clipboard => "CLIPBOARD",
            Selection::Primary => "PRIMARY",
            Selection::Secondary => "SECONDARY",
            Selection::Named(name) => name,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an empty selection name.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("The selection name is empty")]
pub struct EmptySelectionName;

impl FromStr for Selection {
    type Err = EmptySelectionName;

    /// Parses a selection name.
    ///
    /// The three well-known selections are matched case-insensitively, anything else is kept
    /// verbatim as [`Selection::Named`] since atom names are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmptySelectionName);
        }

        let selection = match s.to_ascii_uppercase().as_str() {
            "CLIPBOARD" => Selection::Clipboard,
            "PRIMARY" => Selection::Primary,
            "SECONDARY" => Selection::Secondary,
            _ => Selection::Named(s.to_owned()),
        };

        Ok(selection)
    }
}
