//! The interactive prompt of `x11-selection-inspect`.

use std::io::{BufRead, Write};

use anyhow::Context;
use log::trace;
use x11_selection_rs::inspect::{get_owner, get_targets, Options, Status, Targets};
use x11_selection_rs::utils::is_text;
use x11_selection_rs::{Selection, Session};

const PROMPT: &str = "Enter action [Owner/Formats/Exit]: ";
const RULE: &str = "=================================================";

/// An action entered at the prompt.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Command {
    Owner,
    Formats,
    Exit,
}

impl Command {
    /// Parses a line of input, ignoring case and surrounding whitespace.
    ///
    /// Both the full action names and their first letters are accepted.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "o" | "owner" => Some(Command::Owner),
            "f" | "formats" => Some(Command::Formats),
            "e" | "exit" => Some(Command::Exit),
            _ => None,
        }
    }
}

/// Runs selection queries and prints their results.
pub struct Inspector<'a, S: ?Sized> {
    session: &'a S,
    selection: Selection,
    options: Options,
}

impl<'a, S: Session + ?Sized> Inspector<'a, S> {
    pub fn new(session: &'a S, selection: Selection, options: Options) -> Self {
        Self {
            session,
            selection,
            options,
        }
    }

    /// Prints the window owning the selection.
    pub fn print_owner(&self, output: &mut impl Write) -> anyhow::Result<()> {
        let owner = get_owner(self.session, &self.selection)
            .context("Couldn't query the selection owner")?;

        match owner {
            Some(window) => writeln!(
                output,
                "Owner of selection \"{}\" is window with ID {}.",
                self.selection, window
            )?,
            None => writeln!(
                output,
                "Selection \"{}\" currently has no owner.",
                self.selection
            )?,
        }

        Ok(())
    }

    /// Prints the targets offered by the selection owner.
    pub fn print_targets(&self, output: &mut impl Write) -> anyhow::Result<()> {
        let Targets { status, targets } = get_targets(self.session, &self.selection, &self.options)
            .context("Couldn't query the selection targets")?;

        match status {
            Status::Declined => {
                writeln!(
                    output,
                    "The selection owner couldn't list the available targets."
                )?;
                return Ok(());
            }
            Status::TimedOut => {
                writeln!(output, "The selection owner didn't answer in time.")?;
                return Ok(());
            }
            Status::Complete | Status::Truncated => {}
        }

        if targets.is_empty() {
            writeln!(output, "The selection owner offers no targets.")?;
            return Ok(());
        }

        writeln!(output, "Available targets:")?;
        for target in &targets {
            match &target.name {
                Some(name) if is_text(name) => writeln!(output, "  - {} (text)", name)?,
                _ => writeln!(output, "  - {}", target)?,
            }
        }

        if status == Status::Truncated {
            writeln!(output, "The list was cut after {} targets.", targets.len())?;
        }

        Ok(())
    }

    /// Prints the ID of the window owning the selection on a line of its own.
    ///
    /// An unowned selection prints nothing to `output` and a notice to `notices`.
    pub fn print_owner_id(
        &self,
        output: &mut impl Write,
        notices: &mut impl Write,
    ) -> anyhow::Result<()> {
        let owner = get_owner(self.session, &self.selection)
            .context("Couldn't query the selection owner")?;

        match owner {
            Some(window) => writeln!(output, "{}", window)?,
            None => writeln!(
                notices,
                "Selection \"{}\" currently has no owner.",
                self.selection
            )?,
        }

        Ok(())
    }

    /// Prints the name of every offered target on a line of its own.
    ///
    /// Declined, timed out and truncated queries are reported on `notices`, so that `output`
    /// only ever holds target names.
    pub fn list_targets(
        &self,
        output: &mut impl Write,
        notices: &mut impl Write,
    ) -> anyhow::Result<()> {
        let Targets { status, targets } = get_targets(self.session, &self.selection, &self.options)
            .context("Couldn't query the selection targets")?;

        for target in &targets {
            writeln!(output, "{}", target)?;
        }

        match status {
            Status::Complete => {}
            Status::Declined => writeln!(
                notices,
                "The selection owner couldn't list the available targets."
            )?,
            Status::TimedOut => writeln!(notices, "The selection owner didn't answer in time.")?,
            Status::Truncated => writeln!(
                notices,
                "The list was cut after {} targets.",
                targets.len()
            )?,
        }

        Ok(())
    }

    fn print_banner(&self, output: &mut impl Write) -> anyhow::Result<()> {
        let selection = &self.selection;

        writeln!(output, "==== X11 Selections Inspection ====")?;
        writeln!(output, "Available actions:")?;
        writeln!(
            output,
            "  O/Owner - display the ID of the window that currently owns the {} selection.",
            selection
        )?;
        writeln!(
            output,
            "  F/Formats - list the formats the {} selection is available in.",
            selection
        )?;
        writeln!(output, "  E/Exit - exit the program.")?;
        writeln!(output, "===================================")?;
        writeln!(output)?;

        Ok(())
    }

    /// Reads actions from `input` until `exit` or the end of input, printing to `output`.
    pub fn run(&self, mut input: impl BufRead, mut output: impl Write) -> anyhow::Result<()> {
        self.print_banner(&mut output)?;

        let mut line = String::new();
        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line).context("Couldn't read the action")? == 0 {
                trace!("End of input");
                writeln!(output)?;
                return Ok(());
            }

            writeln!(output)?;

            match Command::parse(&line) {
                Some(Command::Owner) => {
                    writeln!(output, "{}", RULE)?;
                    writeln!(output, "         ACTION: show selection owner")?;
                    writeln!(output, "{}", RULE)?;
                    self.print_owner(&mut output)?;
                    writeln!(output, "{}", RULE)?;
                }
                Some(Command::Formats) => {
                    writeln!(output, "{}", RULE)?;
                    writeln!(output, "    ACTION: check available selection formats")?;
                    writeln!(output, "{}", RULE)?;
                    self.print_targets(&mut output)?;
                    writeln!(output, "{}", RULE)?;
                }
                Some(Command::Exit) => {
                    writeln!(output, "Exiting.")?;
                    return Ok(());
                }
                None if line.trim().is_empty() => {}
                None => writeln!(output, "Unsupported action, try again.")?,
            }
        }
    }
}
