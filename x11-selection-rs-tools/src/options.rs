use clap::Parser;

#[derive(Parser)]
#[command(
    name = "x11-selection-inspect",
    version,
    about = "Inspect the owner and the offered targets of an X11 selection."
)]
pub struct Options {
    /// Print the ID of the window owning the selection and exit
    #[arg(long, short, conflicts_with = "list_types")]
    pub owner: bool,

    /// Print the targets offered by the selection owner and exit
    ///
    /// Without --owner or --list-types an interactive prompt is started.
    #[arg(long, short)]
    pub list_types: bool,

    /// The X display to connect to
    ///
    /// By default the DISPLAY environment variable is used.
    #[arg(long, short)]
    pub display: Option<String>,

    /// The selection to inspect
    ///
    /// CLIPBOARD, PRIMARY and SECONDARY are matched case-insensitively, any other name is used
    /// as is.
    #[arg(long, short, default_value = "CLIPBOARD")]
    pub selection: String,

    /// How long to wait for the selection owner to list its targets, in milliseconds
    ///
    /// 0 waits forever.
    #[arg(long, short, value_name = "MILLISECONDS", default_value_t = 4000)]
    pub timeout: u64,

    /// Enable verbose logging
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
