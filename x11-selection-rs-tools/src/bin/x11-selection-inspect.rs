#![deny(unsafe_code)]

use std::io::{stderr, stdin, stdout};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::trace;
use x11_selection_rs::inspect;
use x11_selection_rs::{Selection, X11Session};
use x11_selection_rs_tools::options::Options;
use x11_selection_rs_tools::repl::Inspector;

fn main() -> Result<(), anyhow::Error> {
    // Parse command-line options.
    let options = Options::parse();

    stderrlog::new()
        .verbosity(usize::from(options.verbose) + 1)
        .init()
        .context("Couldn't initialize logging")?;

    let selection: Selection = options
        .selection
        .parse()
        .context("Invalid selection name")?;

    let timeout = match options.timeout {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };
    let mut inspect_options = inspect::Options::new();
    inspect_options.timeout(timeout);

    let session = X11Session::connect(options.display.as_deref())
        .context("Couldn't connect to the X server")?;
    trace!("Connected, root window {}", session.root());

    let inspector = Inspector::new(&session, selection, inspect_options);

    if options.owner {
        return inspector.print_owner_id(&mut stdout().lock(), &mut stderr().lock());
    }

    if options.list_types {
        return inspector.list_targets(&mut stdout().lock(), &mut stderr().lock());
    }

    // Otherwise, start the interactive prompt.
    inspector.run(stdin().lock(), stdout().lock())
}
