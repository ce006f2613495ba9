//! WAL table specs

use crate::prelude::*;

#[test]
fn wal_rows_are_visible_after_drain() {
    let temp = Project::empty();
    temp.exec(&[&format!("{PARTITIONED} wal"), "insert into x values (1, 7)"])
        .stdout_has("logged 1 [seq=1]");
    temp.exec(&["select count(*) from x"]).stdout_has("count\n0\n");

    temp.quill()
        .args(&["exec", "--drain", "update x set v = 8 where v = 7"])
        .passes()
        .stdout_has("logged change [seq=2]")
        .stdout_has("applied 2 log entries");
    temp.exec(&["select v from x"]).stdout_eq("v\n8\n");
}

#[test]
fn apply_command_drains_every_table() {
    let temp = Project::empty();
    temp.exec(&[
        &format!("{PARTITIONED} wal"),
        "create table y (ts timestamp, v long) timestamp(ts) partition by day wal",
        "insert into x values (1, 1)",
        "insert into y values (1, 1), (2, 2)",
    ]);

    temp.quill()
        .args(&["apply"])
        .passes()
        .stdout_has("x: applied 1 (0 pending)")
        .stdout_has("y: applied 1 (0 pending)");
    temp.quill().args(&["apply"]).passes().stdout_has("Nothing to apply");
    temp.exec(&["select count(*) from y"]).stdout_has("2");
}

#[test]
fn bind_variables_reach_logged_changes() {
    let temp = Project::empty();
    temp.exec(&[&format!("{PARTITIONED} wal"), "insert into x values (1, 1)"]);
    temp.quill()
        .args(&["exec", "--bind", "v=41", "--drain", "update x set v = :v"])
        .passes();
    temp.exec(&["select v from x"]).stdout_eq("v\n41\n");
}

#[test]
fn direct_table_applies_immediately() {
    let temp = Project::empty();
    temp.exec(&[&format!("{PARTITIONED} bypass wal"), "insert into x values (1, 1), (2, 2)"])
        .stdout_has("created x (BYPASS_WAL)")
        .stdout_has("inserted 2");
    temp.exec(&["update x set v = 0"]).stdout_has("applied 2");
}
