use clap::Command;

pub const NAME: &str = "delete-users";

#[must_use]
pub fn subcommand() -> Command {
    Command::new(NAME).about("Delete every user account (irreversible, no confirmation)")
}
