//! The connection to the display server, as seen by the selection queries.
//!
//! The queries in [`inspect`](crate::inspect) only need a handful of X11 requests. They are
//! collected in the [`Session`] trait so that the queries can run against a real X server
//! ([`X11Session`](crate::X11Session)) or against an in-process fake.

use std::time::Instant;

use crate::common::Error;

/// An X11 atom.
pub type Atom = u32;

/// An X11 window identifier.
pub type Window = u32;

/// The X11 `None` value, used for "no owner" and "no property".
pub const NONE: u32 = 0;

/// A slice of a window property, as returned by `GetProperty`.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct PropertyChunk {
    /// The actual type of the property, [`NONE`] if the property does not exist.
    pub type_: Atom,
    /// The unit size of the value in bits: 0 (no property), 8, 16 or 32.
    pub format: u8,
    /// The returned bytes, in native byte order.
    pub value: Vec<u8>,
    /// The number of bytes of the property that remain after this chunk.
    pub bytes_after: u32,
}

impl PropertyChunk {
    /// Interprets the value as a list of 32-bit items.
    ///
    /// Returns `None` if the format is not 32.
    pub fn value32(&self) -> Option<impl Iterator<Item = u32> + '_> {
        if self.format != 32 {
            return None;
        }

        Some(
            self.value
                .chunks_exact(4)
                .map(|bytes| u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        )
    }
}

/// A `SelectionNotify` event: the selection owner's answer to `ConvertSelection`.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct SelectionNotify {
    pub requestor: Window,
    pub selection: Atom,
    pub target: Atom,
    /// The property the converted data was stored in, [`NONE`] if the conversion failed.
    pub property: Atom,
}

/// An event received from the display server.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Event {
    SelectionNotify(SelectionNotify),
    /// Any event the selection queries have no use for.
    Other,
}

/// Operations on a live display server connection.
///
/// Every method is a single request to the server. Implementations are used strictly
/// sequentially.
pub trait Session {
    /// Returns the atom for `name`, creating it if it does not exist yet.
    fn intern_atom(&self, name: &str) -> Result<Atom, Error>;

    /// Returns the name of `atom`.
    ///
    /// Fails with [`Error::BadAtom`] if the server does not know the atom.
    fn atom_name(&self, atom: Atom) -> Result<String, Error>;

    /// Returns the current owner of `selection`, or `None` if nobody owns it.
    fn selection_owner(&self, selection: Atom) -> Result<Option<Window>, Error>;

    /// Creates an unmapped 1×1 window to receive selection data on.
    fn create_window(&self) -> Result<Window, Error>;

    fn destroy_window(&self, window: Window) -> Result<(), Error>;

    /// Asks the owner of `selection` to convert it to `target` and store the result in
    /// `property` on `requestor`, using the current server time.
    fn convert_selection(
        &self,
        requestor: Window,
        selection: Atom,
        target: Atom,
        property: Atom,
    ) -> Result<(), Error>;

    /// Reads up to `length` 32-bit units of `property` on `window`, starting at `offset`
    /// (also in 32-bit units). The property is not deleted.
    fn get_property(
        &self,
        window: Window,
        property: Atom,
        offset: u32,
        length: u32,
    ) -> Result<PropertyChunk, Error>;

    fn delete_property(&self, window: Window, property: Atom) -> Result<(), Error>;

    /// Returns the next event, waiting for one until `deadline`.
    ///
    /// Returns `Ok(None)` once the deadline has passed. A `None` deadline waits forever.
    fn next_event(&self, deadline: Option<Instant>) -> Result<Option<Event>, Error>;
}
