//! Текстовое представление значения и литерал SQL.

use std::fmt::{Display, LowerExp, Write};

use super::{convert::local, temporal, Value};

impl Value {
    /// Каноническое текстовое представление; `None` для null-or-empty.
    pub fn as_string(&self) -> Option<String> {
        if self.is_null_or_empty() {
            return None;
        }
        let s = match self {
            Value::Bool(Some(b)) => b.to_string(),
            Value::Int8(Some(v)) => v.to_string(),
            Value::Int16(Some(v)) => v.to_string(),
            Value::Int32(Some(v)) => v.to_string(),
            Value::Int64(Some(v)) => v.to_string(),
            Value::UInt8(Some(v)) => v.to_string(),
            Value::UInt16(Some(v)) => v.to_string(),
            Value::UInt32(Some(v)) => v.to_string(),
            Value::UInt64(Some(v)) => v.to_string(),
            Value::Float32(Some(v)) => java_float(*v),
            Value::Float64(Some(v)) => java_float(*v),
            Value::WideInt { value: Some(b), .. } => b.to_string(),
            Value::Decimal { value: Some(d), .. } => d.to_string(),
            Value::String { value: Some(b), .. } => String::from_utf8_lossy(b).into_owned(),
            Value::Date(Some(d)) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime {
                value: Some(dt),
                scale,
                tz,
            } => temporal::format_date_time(&local(dt, tz), *scale),
            Value::Time {
                value: Some(n),
                scale,
            } => temporal::format_time(*n, *scale),
            Value::Enum {
                value: Some(code),
                def,
            } => def
                .name_of(*code)
                .map_or_else(|| code.to_string(), str::to_string),
            Value::Uuid(Some(u)) => u.hyphenated().to_string(),
            Value::Ipv4(Some(ip)) => ip.to_string(),
            Value::Ipv6(Some(ip)) => ip.to_string(),
            container if container.is_container() => container.to_sql_expression(),
            _ => return None,
        };
        Some(s)
    }

    /// Литерал для текста запроса.
    pub fn to_sql_expression(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    fn write_sql(
        &self,
        out: &mut String,
    ) {
        match self {
            Value::Array { items, .. } => write_list(out, '[', items, ']'),
            Value::Tuple { fields, .. } => write_list(out, '(', fields, ')'),
            Value::Map { keys, values, .. } => {
                out.push('{');
                for (i, (k, v)) in keys.iter().zip(values).enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    k.write_sql(out);
                    out.push_str(" : ");
                    v.write_sql(out);
                }
                out.push('}');
            }
            Value::Nested { rows, .. } if rows.is_empty() => out.push_str("[]"),
            Value::Nested { rows, .. } => {
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_list(out, '[', row, ']');
                }
            }
            scalar if scalar.is_null() => out.push_str("NULL"),
            Value::Bool(Some(b)) => out.push(if *b { '1' } else { '0' }),
            Value::Float32(Some(v)) => write_float(out, *v as f64, || java_float(*v)),
            Value::Float64(Some(v)) => write_float(out, *v, || java_float(*v)),
            Value::Enum { value: Some(code), .. } => {
                let _ = write!(out, "{code}");
            }
            Value::String { .. }
            | Value::Date(_)
            | Value::DateTime { .. }
            | Value::Time { .. }
            | Value::Uuid(_)
            | Value::Ipv4(_)
            | Value::Ipv6(_) => {
                let text = self.as_string().unwrap_or_default();
                quote_into(out, &text);
            }
            other => out.push_str(&other.as_string().unwrap_or_default()),
        }
    }
}

fn write_list(
    out: &mut String,
    open: char,
    items: &[Value],
    close: char,
) {
    out.push(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        item.write_sql(out);
    }
    out.push(close);
}

fn write_float(
    out: &mut String,
    v: f64,
    finite: impl FnOnce() -> String,
) {
    if v.is_nan() {
        out.push_str("NaN");
    } else if v == f64::INFINITY {
        out.push_str("Inf");
    } else if v == f64::NEG_INFINITY {
        out.push_str("-Inf");
    } else {
        out.push_str(&finite());
    }
}

/// Строка в одинарных кавычках; `\` и `'` экранируются.
pub(crate) fn quote_into(
    out: &mut String,
    text: &str,
) {
    out.reserve(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
}

/// Вывод float в виде `1.0`, `1.0E10`, `NaN`, `Infinity`.
fn java_float<F>(v: F) -> String
where
    F: Display + LowerExp + Into<f64> + Copy,
{
    let f: f64 = v.into();
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = f.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        let s = v.to_string();
        if s.contains('.') {
            s
        } else {
            s + ".0"
        }
    } else {
        let s = format!("{v:e}");
        let (mantissa, exp) = s.split_once('e').unwrap_or((&s, "0"));
        if mantissa.contains('.') {
            format!("{mantissa}E{exp}")
        } else {
            format!("{mantissa}.0E{exp}")
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
