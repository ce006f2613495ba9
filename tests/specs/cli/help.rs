//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("exec")
        .stdout_has("tables")
        .stdout_has("apply");
}

#[test]
fn exec_help_shows_drain_flag() {
    cli()
        .args(&["exec", "--help"])
        .passes()
        .stdout_has("--drain")
        .stdout_has("--bind")
        .stdout_has("--tables");
}
