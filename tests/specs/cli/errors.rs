//! Error reporting specs

use crate::prelude::*;

#[test]
fn unknown_table_fails() {
    let temp = Project::empty();
    temp.quill()
        .args(&["exec", "select * from nope"])
        .fails()
        .stderr_has("table does not exist [table=nope]");
}

#[test]
fn syntax_error_reports_statement() {
    let temp = Project::empty();
    temp.quill()
        .args(&["exec", "selec 1"])
        .fails()
        .stderr_has("error: selec 1");
}

#[test]
fn exec_requires_a_statement() {
    let temp = Project::empty();
    temp.quill().args(&["exec"]).fails();
}

#[test]
fn invalid_config_is_rejected() {
    let temp = Project::empty();
    temp.file("quill.toml", "[apply]\nworkers = 0\n");
    temp.quill().args(&["tables"]).fails().stderr_has("workers");
}

#[test]
fn unknown_config_key_is_rejected() {
    let temp = Project::empty();
    temp.file("custom.toml", "[query_cache]\nslots = 3\n");
    let config = temp.path().join("custom.toml");
    temp.quill()
        .args(&["--config", config.to_str().unwrap(), "tables"])
        .fails()
        .stderr_has("slots");
}

#[test]
fn statements_stop_at_first_failure() {
    let temp = Project::empty();
    temp.quill()
        .args(&["exec", PARTITIONED, "insert into x values (1)", "insert into x values (2, 2)"])
        .fails();
    temp.quill()
        .args(&["exec", "select count(*) from x"])
        .passes()
        .stdout_has("0");
}

#[test]
fn table_name_cannot_leave_data_dir() {
    let temp = Project::empty();
    temp.quill()
        .args(&["exec", "create table \"../escaped\" (ts timestamp, v long)"])
        .fails()
        .stderr_has("invalid table name");
    temp.quill().args(&["tables"]).passes().stdout_has("No tables");
}
