use std::time::Instant;

use log::{debug, trace};
use rustix::event::{poll, PollFd, PollFlags};
use rustix::io::Errno;
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt as _, CreateWindowAux, WindowClass};
use x11rb::protocol::{ErrorKind, Event as X11Event};
use x11rb::rust_connection::RustConnection;
use x11rb::{COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT, CURRENT_TIME};

use crate::common::{initialize, Error, SetupError};
use crate::session::{Atom, Event, PropertyChunk, SelectionNotify, Session, Window, NONE};

/// A [`Session`] backed by a connection to a real X server.
///
/// The connection is closed when the session is dropped.
pub struct X11Session {
    conn: RustConnection,
    root: Window,
}

impl X11Session {
    /// Connects to the X server.
    ///
    /// If `display` is `None`, the `DISPLAY` environment variable is used.
    pub fn connect(display: Option<&str>) -> Result<Self, SetupError> {
        let (conn, root) = initialize(display)?;
        trace!("Connected to the X server, root window {}", root);

        Ok(Self { conn, root })
    }

    /// Returns the root window of the default screen.
    pub fn root(&self) -> Window {
        self.root
    }
}

/// Converts a deadline into a `poll(2)` timeout in milliseconds, `-1` waiting forever.
///
/// Returns `None` once the deadline has passed.
pub(crate) fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Option<i32> {
    let deadline = match deadline {
        None => return Some(-1),
        Some(deadline) => deadline,
    };

    if now >= deadline {
        return None;
    }

    // Round up so that we don't spin on a sub-millisecond remainder.
    let remaining = deadline - now;
    let millis = remaining.as_millis() + u128::from(remaining.subsec_nanos() % 1_000_000 != 0);
    Some(millis.min(i32::MAX as u128) as i32)
}

impl Session for X11Session {
    fn intern_atom(&self, name: &str) -> Result<Atom, Error> {
        Ok(self.conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
    }

    fn atom_name(&self, atom: Atom) -> Result<String, Error> {
        match self.conn.get_atom_name(atom)?.reply() {
            Ok(reply) => Ok(String::from_utf8_lossy(&reply.name).into_owned()),
            Err(ReplyError::X11Error(err)) if err.error_kind == ErrorKind::Atom => {
                Err(Error::BadAtom(atom))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn selection_owner(&self, selection: Atom) -> Result<Option<Window>, Error> {
        let owner = self.conn.get_selection_owner(selection)?.reply()?.owner;
        Ok((owner != NONE).then_some(owner))
    }

    fn create_window(&self) -> Result<Window, Error> {
        let window = self.conn.generate_id()?;

        self.conn
            .create_window(
                COPY_DEPTH_FROM_PARENT,
                window,
                self.root,
                0,
                0,
                1,
                1,
                0,
                WindowClass::INPUT_OUTPUT,
                COPY_FROM_PARENT,
                &CreateWindowAux::new(),
            )?
            .check()?;

        Ok(window)
    }

    fn destroy_window(&self, window: Window) -> Result<(), Error> {
        self.conn.destroy_window(window)?.check()?;
        Ok(())
    }

    fn convert_selection(
        &self,
        requestor: Window,
        selection: Atom,
        target: Atom,
        property: Atom,
    ) -> Result<(), Error> {
        self.conn
            .convert_selection(requestor, selection, target, property, CURRENT_TIME)?
            .check()?;
        Ok(())
    }

    fn get_property(
        &self,
        window: Window,
        property: Atom,
        offset: u32,
        length: u32,
    ) -> Result<PropertyChunk, Error> {
        let reply = self
            .conn
            .get_property(false, window, property, AtomEnum::ANY, offset, length)?
            .reply()?;

        Ok(PropertyChunk {
            type_: reply.type_,
            format: reply.format,
            value: reply.value,
            bytes_after: reply.bytes_after,
        })
    }

    fn delete_property(&self, window: Window, property: Atom) -> Result<(), Error> {
        self.conn.delete_property(window, property)?.check()?;
        Ok(())
    }

    fn next_event(&self, deadline: Option<Instant>) -> Result<Option<Event>, Error> {
        loop {
            let timeout = match poll_timeout(deadline, Instant::now()) {
                Some(timeout) => timeout,
                None => return Ok(None),
            };

            // Events may already be queued inside the connection, so check before polling the
            // socket.
            if let Some(event) = self.conn.poll_for_event()? {
                let event = match event {
                    X11Event::SelectionNotify(event) => Event::SelectionNotify(SelectionNotify {
                        requestor: event.requestor,
                        selection: event.selection,
                        target: event.target,
                        property: event.property,
                    }),
                    event => {
                        debug!("Received an unrelated event: {:?}", event);
                        Event::Other
                    }
                };

                return Ok(Some(event));
            }

            self.conn.flush()?;

            let mut fds = [PollFd::new(self.conn.stream(), PollFlags::IN)];
            match poll(&mut fds, timeout) {
                Ok(_) | Err(Errno::INTR) => {}
                Err(err) => return Err(Error::Poll(err)),
            }
        }
    }
}
