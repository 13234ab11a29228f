//! Custom Tera filters available to every topology template.

use std::collections::HashMap;

use heck::{ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use tera::{Result, Tera, Value};

pub(crate) fn register(tera: &mut Tera) {
    tera.register_filter("snake_case", snake_case);
    tera.register_filter("pascal_case", pascal_case);
    tera.register_filter("shouty_snake_case", shouty_snake_case);
    tera.register_filter("hex", hex);
}

fn expect_str<'a>(value: &'a Value, filter: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{filter} filter expects a string")))
}

fn snake_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(expect_str(value, "snake_case")?.to_snake_case()))
}

fn pascal_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(expect_str(value, "pascal_case")?.to_pascal_case()))
}

fn shouty_snake_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(
        expect_str(value, "shouty_snake_case")?.to_shouty_snake_case(),
    ))
}

/// Format a non-negative integer as `0x`-prefixed lowercase hex, e.g. for base ids.
fn hex(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let n = value
        .as_u64()
        .ok_or_else(|| tera::Error::msg("hex filter expects a non-negative integer"))?;
    Ok(Value::String(format!("0x{n:x}")))
}
