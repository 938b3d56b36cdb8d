//! Querying the selection owner and the targets it offers.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use x11rb::errors::{ConnectionError, ReplyError};

use crate::common;
use crate::session::{Atom, Event, SelectionNotify, Session, Window, NONE};
use crate::Selection;

/// Name of the property the selection owner stores the target list in.
const REPLY_PROPERTY: &str = "X11_SELECTION_RS_TARGETS";

/// Options for [`get_targets()`].
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Options {
    /// How long to wait for the selection owner to answer.
    timeout: Option<Duration>,

    /// Number of atoms requested by the first property read.
    chunk_len: u32,

    /// Upper bound on the number of atoms read in total.
    max_len: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(4)),
            chunk_len: 64,
            max_len: 65536,
        }
    }
}

impl Options {
    /// Creates the default set of options: a 4 second timeout, reads of 64 atoms at first and at
    /// most 65536 atoms in total.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how long to wait for the selection owner to answer.
    ///
    /// `None` waits forever, which means a selection owner that never answers blocks the call
    /// indefinitely.
    #[inline]
    pub fn timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of atoms requested by the first property read.
    ///
    /// Longer target lists are read in further requests, so this only affects the number of
    /// round trips. Values below 1 are treated as 1.
    #[inline]
    pub fn chunk_len(&mut self, chunk_len: u32) -> &mut Self {
        self.chunk_len = chunk_len.max(1);
        self
    }

    /// Sets the maximum number of atoms to read.
    ///
    /// If the selection owner offers more targets, the result is [`Status::Truncated`].
    #[inline]
    pub fn max_len(&mut self, max_len: u32) -> &mut Self {
        self.max_len = max_len;
        self
    }
}

/// How a targets query ended.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Status {
    /// The owner answered and the whole target list was read.
    Complete,
    /// The owner answered that it couldn't convert the selection to `TARGETS`.
    ///
    /// This also happens when the selection has no owner: the server answers on its behalf.
    Declined,
    /// The owner offers more targets than [`Options::max_len()`] allows, only the first ones were
    /// read.
    Truncated,
    /// The owner didn't answer within [`Options::timeout()`].
    TimedOut,
}

/// A target offered by the selection owner.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Target {
    pub atom: Atom,
    /// Name of the atom, `None` if the server couldn't resolve it.
    pub name: Option<String>,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => write!(f, "<unknown atom {}>", self.atom),
        }
    }
}

/// The result of [`get_targets()`].
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Targets {
    pub status: Status,
    /// The targets in the order the owner listed them. Empty for [`Status::Declined`] and
    /// [`Status::TimedOut`].
    pub targets: Vec<Target>,
}

impl Targets {
    fn empty(status: Status) -> Self {
        Self {
            status,
            targets: Vec::new(),
        }
    }
}

/// Errors that can occur when querying a selection.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("The selection name is empty")]
    EmptySelectionName,

    #[error("X server communication error")]
    X11Communication(#[source] ConnectionError),

    #[error("The X server returned an error")]
    X11Reply(#[source] ReplyError),

    #[error("The X server ran out of resource identifiers for this client")]
    X11IdsExhausted,

    #[error("Couldn't wait for events from the X server")]
    Poll(#[source] rustix::io::Errno),

    #[error("The X server does not know atom {0}")]
    BadAtom(Atom),

    #[error("The selection owner started an incremental transfer, which is not supported")]
    IncrementalTransfer,

    #[error("The selection owner stored the targets with format {format} instead of 32")]
    UnexpectedFormat { format: u8 },
}

impl From<common::Error> for Error {
    fn from(x: common::Error) -> Self {
        use common::Error::*;

        match x {
            X11Communication(err) => Error::X11Communication(err),
            X11Reply(err) => Error::X11Reply(err),
            X11IdsExhausted => Error::X11IdsExhausted,
            Poll(err) => Error::Poll(err),
            BadAtom(atom) => Error::BadAtom(atom),
        }
    }
}

fn intern_selection<S: Session + ?Sized>(
    session: &S,
    selection: &Selection,
) -> Result<Atom, Error> {
    let name = selection.name();
    if name.is_empty() {
        return Err(Error::EmptySelectionName);
    }

    Ok(session.intern_atom(name)?)
}

/// Retrieves the window that currently owns the selection.
///
/// Returns `None` if the selection has no owner. The server answers this from its own state, the
/// owner itself is not contacted.
///
/// # Examples
///
/// ```no_run
/// # extern crate x11_selection_rs;
/// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use x11_selection_rs::{inspect::get_owner, Selection, X11Session};
///
/// let session = X11Session::connect(None)?;
/// if let Some(window) = get_owner(&session, &Selection::Primary)? {
///     println!("PRIMARY is owned by 0x{:x}", window);
/// }
/// # Ok(())
/// # }
/// ```
pub fn get_owner<S: Session + ?Sized>(
    session: &S,
    selection: &Selection,
) -> Result<Option<Window>, Error> {
    let atom = intern_selection(session, selection)?;
    let owner = session.selection_owner(atom)?;
    trace!("Owner of {}: {:?}", selection, owner);

    Ok(owner)
}

/// The temporary window the selection owner delivers the targets to.
///
/// Deletes the reply property and destroys the window when dropped.
struct RequestorWindow<'a, S: Session + ?Sized> {
    session: &'a S,
    window: Window,
    property: Atom,
}

impl<'a, S: Session + ?Sized> RequestorWindow<'a, S> {
    fn create(session: &'a S) -> Result<Self, Error> {
        trace!("Creating the temporary window");
        let window = session.create_window()?;

        // Intern after creating the window so that the guard exists before anything else can
        // fail.
        let mut requestor = Self {
            session,
            window,
            property: NONE,
        };
        requestor.property = session.intern_atom(REPLY_PROPERTY)?;

        Ok(requestor)
    }

    fn is_reply(&self, event: &SelectionNotify, selection: Atom) -> bool {
        event.requestor == self.window
            && event.selection == selection
            && (event.property == self.property || event.property == NONE)
    }
}

impl<S: Session + ?Sized> Drop for RequestorWindow<'_, S> {
    fn drop(&mut self) {
        trace!("Deleting the property and the temporary window");

        if self.property != NONE {
            if let Err(err) = self.session.delete_property(self.window, self.property) {
                warn!("Couldn't delete the reply property: {}", err);
            }
        }

        if let Err(err) = self.session.destroy_window(self.window) {
            warn!("Couldn't destroy the temporary window: {}", err);
        }
    }
}

/// Waits for the owner's `SelectionNotify`, dropping every other event.
///
/// Returns `None` if the deadline passes first.
fn wait_for_reply<S: Session + ?Sized>(
    session: &S,
    requestor: &RequestorWindow<'_, S>,
    selection: Atom,
    deadline: Option<Instant>,
) -> Result<Option<SelectionNotify>, Error> {
    loop {
        trace!("Waiting for SelectionNotify");
        match session.next_event(deadline)? {
            None => return Ok(None),
            Some(Event::SelectionNotify(event)) if requestor.is_reply(&event, selection) => {
                trace!("Got SelectionNotify");
                return Ok(Some(event));
            }
            Some(event) => debug!("Discarding event {:?}", event),
        }

        // A steady stream of unrelated events must not hold off the deadline.
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Ok(None);
        }
    }
}

/// Reads the atom list from the reply property, following `bytes_after` until the end.
///
/// Returns the atoms and whether the list had to be cut at `max_len`.
fn read_atoms<S: Session + ?Sized>(
    session: &S,
    requestor: &RequestorWindow<'_, S>,
    options: &Options,
    incr: Atom,
) -> Result<(Vec<Atom>, bool), Error> {
    let mut atoms = Vec::new();
    let mut length = options.chunk_len;

    loop {
        let offset = atoms.len() as u32;
        let read_len = length.min(options.max_len.saturating_sub(offset));

        trace!("Reading the property at offset {} length {}", offset, read_len);
        let chunk =
            session.get_property(requestor.window, requestor.property, offset, read_len)?;

        if chunk.type_ == NONE {
            // The owner deleted the property or never stored one.
            return Ok((atoms, false));
        }
        if chunk.type_ == incr {
            return Err(Error::IncrementalTransfer);
        }

        let values = chunk.value32().ok_or(Error::UnexpectedFormat {
            format: chunk.format,
        })?;
        atoms.extend(values);

        if chunk.bytes_after == 0 {
            return Ok((atoms, false));
        }

        if atoms.len() as u32 >= options.max_len {
            warn!(
                "The target list is longer than {} atoms, {} more bytes were not read",
                options.max_len, chunk.bytes_after
            );
            return Ok((atoms, true));
        }

        // Size the next read after what is left.
        length = chunk.bytes_after.div_ceil(4);
    }
}

/// Resolves the atoms to their names.
///
/// Atoms the server doesn't know are kept without a name.
fn resolve_names<S: Session + ?Sized>(
    session: &S,
    atoms: Vec<Atom>,
) -> Result<Vec<Target>, Error> {
    atoms
        .into_iter()
        .map(|atom| match session.atom_name(atom) {
            Ok(name) => Ok(Target {
                atom,
                name: Some(name),
            }),
            Err(common::Error::BadAtom(_)) => {
                warn!("Couldn't resolve the name of atom {}", atom);
                Ok(Target { atom, name: None })
            }
            Err(err) => Err(err.into()),
        })
        .collect()
}

/// Retrieves the targets the selection owner offers.
///
/// This asks the owner to convert the selection to `TARGETS` and reads the answer from a
/// temporary window, which is destroyed before returning. A declined conversion, an owner that
/// doesn't answer in time and a target list longer than [`Options::max_len()`] are reported
/// through [`Targets::status`] rather than as errors.
///
/// # Examples
///
/// ```no_run
/// # extern crate x11_selection_rs;
/// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use x11_selection_rs::{inspect::{get_targets, Options}, Selection, X11Session};
///
/// let session = X11Session::connect(None)?;
/// let result = get_targets(&session, &Selection::Clipboard, &Options::new())?;
/// println!("{:?}", result.status);
/// for target in result.targets {
///     println!("{}", target);
/// }
/// # Ok(())
/// # }
/// ```
pub fn get_targets<S: Session + ?Sized>(
    session: &S,
    selection: &Selection,
    options: &Options,
) -> Result<Targets, Error> {
    let selection_atom = intern_selection(session, selection)?;
    let targets_atom = session.intern_atom("TARGETS")?;
    let incr_atom = session.intern_atom("INCR")?;

    let requestor = RequestorWindow::create(session)?;

    trace!("Requesting {} as TARGETS", selection);
    let deadline = options.timeout.map(|timeout| Instant::now() + timeout);
    session.convert_selection(
        requestor.window,
        selection_atom,
        targets_atom,
        requestor.property,
    )?;

    let reply = match wait_for_reply(session, &requestor, selection_atom, deadline)? {
        Some(reply) => reply,
        None => {
            debug!("The owner of {} didn't answer in time", selection);
            return Ok(Targets::empty(Status::TimedOut));
        }
    };

    if reply.property == NONE {
        debug!("The owner of {} couldn't convert to TARGETS", selection);
        return Ok(Targets::empty(Status::Declined));
    }

    let (atoms, truncated) = read_atoms(session, &requestor, options, incr_atom)?;
    let targets = resolve_names(session, atoms)?;

    let status = if truncated {
        Status::Truncated
    } else {
        Status::Complete
    };

    Ok(Targets { status, targets })
}
