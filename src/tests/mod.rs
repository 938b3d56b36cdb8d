//! Test X server implementation.
//!
//! [`TestServer`] is an in-process stand-in for the X server and the selection owners connected
//! to it. It keeps track of atoms, windows and properties, and answers `ConvertSelection`
//! requests on behalf of scripted owners, queueing the resulting events.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::thread;
use std::time::Instant;

use crate::common::Error;
use crate::session::{Atom, Event, PropertyChunk, SelectionNotify, Session, Window, NONE};

mod x11;

/// How a selection owner reacts to a `ConvertSelection` request for `TARGETS`.
#[derive(Debug, Clone)]
pub enum OwnerInfo {
    /// Store these targets as an `ATOM` list and notify.
    Targets(Vec<String>),
    /// Store these raw atom values as an `ATOM` list and notify.
    Atoms(Vec<Atom>),
    /// Store an arbitrary property and notify.
    Property {
        type_: String,
        format: u8,
        value: Vec<u8>,
    },
    /// Notify with the property set to `None`.
    Decline,
    /// Never answer.
    Silent,
}

#[derive(Debug, Clone)]
struct Property {
    type_: Atom,
    format: u8,
    value: Vec<u8>,
}

#[derive(Default)]
struct State {
    atom_names: Vec<String>,
    atoms: HashMap<String, Atom>,
    next_window: Window,
    windows: HashSet<Window>,
    properties: HashMap<(Window, Atom), Property>,
    owners: HashMap<String, (Window, OwnerInfo)>,
    events: VecDeque<Event>,
    noise: usize,
    property_reads: Vec<(u32, u32)>,
}

impl State {
    fn intern(&mut self, name: &str) -> Atom {
        if let Some(atom) = self.atoms.get(name) {
            return *atom;
        }

        self.atom_names.push(name.to_owned());
        let atom = self.atom_names.len() as Atom;
        self.atoms.insert(name.to_owned(), atom);
        atom
    }

    fn name(&self, atom: Atom) -> Option<&str> {
        let index = usize::try_from(atom).ok()?.checked_sub(1)?;
        self.atom_names.get(index).map(String::as_str)
    }
}

pub struct TestServer {
    state: RefCell<State>,
}

impl TestServer {
    pub fn new() -> Self {
        TestServer {
            state: RefCell::new(State {
                next_window: 0x0020_0001,
                ..Default::default()
            }),
        }
    }

    /// Makes `window` the owner of `selection`, answering as `info` describes.
    pub fn set_owner(&self, selection: &str, window: Window, info: OwnerInfo) {
        let mut state = self.state.borrow_mut();
        state.intern(selection);
        state.owners.insert(selection.to_owned(), (window, info));
    }

    /// Queues `count` unrelated events ahead of every owner answer.
    pub fn set_noise(&self, count: usize) {
        self.state.borrow_mut().noise = count;
    }

    pub fn intern(&self, name: &str) -> Atom {
        self.state.borrow_mut().intern(name)
    }

    /// Number of windows created by the client that still exist.
    pub fn window_count(&self) -> usize {
        self.state.borrow().windows.len()
    }

    /// Number of properties that still exist on the client's windows.
    pub fn property_count(&self) -> usize {
        self.state.borrow().properties.len()
    }

    /// Offsets and lengths of all `GetProperty` requests so far.
    pub fn property_reads(&self) -> Vec<(u32, u32)> {
        self.state.borrow().property_reads.clone()
    }
}

impl Session for TestServer {
    fn intern_atom(&self, name: &str) -> Result<Atom, Error> {
        Ok(self.state.borrow_mut().intern(name))
    }

    fn atom_name(&self, atom: Atom) -> Result<String, Error> {
        self.state
            .borrow()
            .name(atom)
            .map(str::to_owned)
            .ok_or(Error::BadAtom(atom))
    }

    fn selection_owner(&self, selection: Atom) -> Result<Option<Window>, Error> {
        let state = self.state.borrow();
        let name = state.name(selection).expect("selection atom was not interned");
        Ok(state.owners.get(name).map(|(window, _)| *window))
    }

    fn create_window(&self) -> Result<Window, Error> {
        let mut state = self.state.borrow_mut();
        let window = state.next_window;
        state.next_window += 1;
        state.windows.insert(window);
        Ok(window)
    }

    fn destroy_window(&self, window: Window) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        assert!(state.windows.remove(&window), "unknown window {}", window);
        state.properties.retain(|(w, _), _| *w != window);
        Ok(())
    }

    fn convert_selection(
        &self,
        requestor: Window,
        selection: Atom,
        target: Atom,
        property: Atom,
    ) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        assert!(state.windows.contains(&requestor), "unknown window {}", requestor);

        for _ in 0..state.noise {
            state.events.push_back(Event::Other);
        }
        // An answer to somebody else's request.
        if state.noise > 0 {
            state
                .events
                .push_back(Event::SelectionNotify(SelectionNotify {
                    requestor: requestor + 1000,
                    selection,
                    target,
                    property,
                }));
        }

        let selection_name = state.name(selection).expect("unknown selection").to_owned();
        let is_targets = state.name(target) == Some("TARGETS");

        let stored = match state.owners.get(&selection_name).cloned() {
            Some((_, OwnerInfo::Silent)) => return Ok(()),
            Some((_, info)) if is_targets => match info {
                OwnerInfo::Targets(names) => {
                    let atoms: Vec<Atom> = names.iter().map(|name| state.intern(name)).collect();
                    Some(atom_property(&mut state, &atoms))
                }
                OwnerInfo::Atoms(atoms) => Some(atom_property(&mut state, &atoms)),
                OwnerInfo::Property {
                    type_,
                    format,
                    value,
                } => Some(Property {
                    type_: state.intern(&type_),
                    format,
                    value,
                }),
                OwnerInfo::Decline | OwnerInfo::Silent => None,
            },
            // Either an unsupported target or no owner, in which case the server declines.
            _ => None,
        };

        let property = match stored {
            Some(stored) => {
                state.properties.insert((requestor, property), stored);
                property
            }
            None => NONE,
        };

        state
            .events
            .push_back(Event::SelectionNotify(SelectionNotify {
                requestor,
                selection,
                target,
                property,
            }));

        Ok(())
    }

    fn get_property(
        &self,
        window: Window,
        property: Atom,
        offset: u32,
        length: u32,
    ) -> Result<PropertyChunk, Error> {
        let mut state = self.state.borrow_mut();
        assert!(state.windows.contains(&window), "unknown window {}", window);
        state.property_reads.push((offset, length));

        let stored = match state.properties.get(&(window, property)) {
            Some(stored) => stored,
            None => return Ok(PropertyChunk::default()),
        };

        // Same arithmetic as the protocol description of GetProperty.
        let total = stored.value.len();
        let start = 4 * offset as usize;
        assert!(start <= total, "offset {} past the end of the property", offset);
        let end = total.min(start + 4 * length as usize);

        Ok(PropertyChunk {
            type_: stored.type_,
            format: stored.format,
            value: stored.value[start..end].to_vec(),
            bytes_after: (total - end) as u32,
        })
    }

    fn delete_property(&self, window: Window, property: Atom) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        assert!(state.windows.contains(&window), "unknown window {}", window);
        state.properties.remove(&(window, property));
        Ok(())
    }

    fn next_event(&self, deadline: Option<Instant>) -> Result<Option<Event>, Error> {
        if let Some(event) = self.state.borrow_mut().events.pop_front() {
            return Ok(Some(event));
        }

        // Nothing else is going to arrive.
        let deadline = deadline.expect("waiting for an event that will never come");
        thread::sleep(deadline.saturating_duration_since(Instant::now()));
        Ok(None)
    }
}

fn atom_property(state: &mut State, atoms: &[Atom]) -> Property {
    Property {
        type_: state.intern("ATOM"),
        format: 32,
        value: atoms.iter().flat_map(|atom| atom.to_ne_bytes()).collect(),
    }
}
