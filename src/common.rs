use x11rb::connection::Connection;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

use crate::session::Atom;

/// Errors that can occur when talking to the X server.
#[derive(thiserror::Error, Debug)]
pub enum Error {
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
}

/// Errors that can occur when connecting to the X server.
#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    #[error("Couldn't connect to the X server")]
    X11Connection(#[source] ConnectError),

    #[error("The X server has no screen number {0}")]
    NoScreen(usize),
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::X11Communication(err)
    }
}

impl From<ReplyError> for Error {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::ConnectionError(err) => Error::X11Communication(err),
            err => Error::X11Reply(err),
        }
    }
}

impl From<ReplyOrIdError> for Error {
    fn from(err: ReplyOrIdError) -> Self {
        match err {
            ReplyOrIdError::IdsExhausted => Error::X11IdsExhausted,
            ReplyOrIdError::ConnectionError(err) => Error::X11Communication(err),
            ReplyOrIdError::X11Error(err) => Error::X11Reply(ReplyError::X11Error(err)),
        }
    }
}

/// Connects to the X server and returns the connection along with its default root window.
///
/// A `display` of `None` uses the `DISPLAY` environment variable.
pub fn initialize(display: Option<&str>) -> Result<(RustConnection, Window), SetupError> {
    let (conn, screen_num) = x11rb::connect(display).map_err(SetupError::X11Connection)?;

    let root = conn
        .setup()
        .roots
        .get(screen_num)
        .map(|screen| screen.root)
        .ok_or(SetupError::NoScreen(screen_num))?;

    Ok((conn, root))
}
