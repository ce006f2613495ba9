//! Storage mode conversion specs

use crate::prelude::*;

#[test]
fn set_type_is_deferred_to_next_open() {
    let temp = Project::empty();
    temp.exec(&[
        &format!("{PARTITIONED} bypass wal"),
        "insert into x values (1, 1)",
    ]);

    temp.quill()
        .args(&["exec", "--tables", "alter table x set type wal"])
        .passes()
        .stdout_has("x converts to WAL on next open")
        .stdout_has("BYPASS_WAL")
        .stdout_has("[-> WAL]");
}

#[test]
fn conversion_applies_on_next_command() {
    let temp = Project::empty();
    temp.exec(&[
        &format!("{PARTITIONED} bypass wal"),
        "insert into x values (1, 1)",
        "alter table x set type wal",
    ]);

    temp.quill()
        .args(&["tables"])
        .passes()
        .stdout_has("WAL")
        .stdout_lacks("BYPASS_WAL")
        .stdout_lacks("[->");
    temp.exec(&["insert into x values (2, 2)"])
        .stdout_has("logged 1");
}

#[test]
fn non_partitioned_table_stays_bypass() {
    let temp = Project::empty();
    temp.exec(&["create table x (ts timestamp, v long)"]);
    temp.quill()
        .args(&["exec", "alter table x set type wal"])
        .fails()
        .stderr_has("non-partitioned");
    temp.quill()
        .args(&["tables"])
        .passes()
        .stdout_has("BYPASS_WAL")
        .stdout_lacks("[->");
}

#[test]
fn tables_json_reports_mode_and_backlog() {
    let temp = Project::empty();
    temp.exec(&[&format!("{PARTITIONED} wal"), "insert into x values (1, 1)"]);
    temp.quill()
        .args(&["tables", "--format", "json"])
        .passes()
        .stdout_has("\"mode\": \"WAL\"")
        .stdout_has("\"pending_records\": 1")
        .stdout_has("\"pending_conversion\": null");
}
