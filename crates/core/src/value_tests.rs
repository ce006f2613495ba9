// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    int_to_long = { Value::Int(3), ColumnType::Long, Some(Value::Long(3)) },
    long_to_int_fits = { Value::Long(7), ColumnType::Int, Some(Value::Int(7)) },
    long_to_int_overflow = { Value::Long(i64::MAX), ColumnType::Int, None },
    long_to_timestamp = { Value::Long(10), ColumnType::Timestamp, Some(Value::Timestamp(10)) },
    null_anywhere = { Value::Null, ColumnType::String, Some(Value::Null) },
    string_to_long = { Value::String("x".into()), ColumnType::Long, None },
    double_to_long = { Value::Double(1.5), ColumnType::Long, None },
    iso_to_timestamp = {
        Value::String("1970-01-01T00:00:01Z".into()),
        ColumnType::Timestamp,
        Some(Value::Timestamp(1_000_000))
    },
    naive_to_timestamp = {
        Value::String("1970-01-01T00:00:00.5".into()),
        ColumnType::Timestamp,
        Some(Value::Timestamp(500_000))
    },
    date_to_timestamp = {
        Value::String("1970-01-02".into()),
        ColumnType::Timestamp,
        Some(Value::Timestamp(86_400_000_000))
    },
    garbage_to_timestamp = { Value::String("soon".into()), ColumnType::Timestamp, None },
)]
fn coerce(value: Value, ty: ColumnType, expected: Option<Value>) {
    assert_eq!(value.coerce_to(ty), expected);
}

#[test]
fn sql_eq_widens_numbers() {
    assert!(Value::Int(1).sql_eq(&Value::Long(1)));
    assert!(Value::Long(2).sql_eq(&Value::Double(2.0)));
    assert!(!Value::Null.sql_eq(&Value::Null));
    assert!(Value::String("a".into()).sql_eq(&Value::String("a".into())));
}

#[test]
fn timestamp_displays_as_iso() {
    assert_eq!(
        Value::Timestamp(0).to_string(),
        "1970-01-01T00:00:00.000000Z"
    );
}

#[test]
fn column_type_aliases() {
    assert_eq!("symbol".parse::<ColumnType>().unwrap(), ColumnType::String);
    assert!("BLOB".parse::<ColumnType>().is_err());
}
