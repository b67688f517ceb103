use std::fmt;

use chdata_error::{ColumnError, DataResult};

/// Описание Enum8/Enum16: разрядность и пары имя/код.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumDef {
    bits: u8,
    names: Vec<String>,
    codes: Vec<i16>,
}

impl EnumDef {
    /// Создаёт описание. Имена и коды должны быть уникальны, коды обязаны
    /// помещаться в разрядность (8 или 16 бит).
    pub fn new(
        bits: u8,
        entries: Vec<(String, i16)>,
    ) -> DataResult<Self> {
        let family = format!("Enum{bits}");
        if bits != 8 && bits != 16 {
            return Err(ColumnError::invalid_arguments(family, "Enum width must be 8 or 16").into());
        }
        if entries.is_empty() {
            return Err(
                ColumnError::invalid_arguments(family, "Enum should have at least one value").into(),
            );
        }

        let mut names = Vec::with_capacity(entries.len());
        let mut codes = Vec::with_capacity(entries.len());
        for (name, code) in entries {
            if bits == 8 && i8::try_from(code).is_err() {
                return Err(ColumnError::invalid_arguments(
                    family,
                    format!("Code {code} of '{name}' does not fit into Enum8"),
                )
                .into());
            }
            if names.contains(&name) {
                return Err(ColumnError::invalid_arguments(
                    family,
                    format!("Duplicate enum name '{name}'"),
                )
                .into());
            }
            if codes.contains(&code) {
                return Err(ColumnError::invalid_arguments(
                    family,
                    format!("Duplicate enum code {code}"),
                )
                .into());
            }
            names.push(name);
            codes.push(code);
        }

        Ok(Self { bits, names, codes })
    }

    /// Выбирает разрядность по диапазону кодов (для `Enum(...)` без ширины).
    pub fn auto(entries: Vec<(String, i16)>) -> DataResult<Self> {
        let fits8 = entries.iter().all(|(_, c)| i8::try_from(*c).is_ok());
        Self::new(if fits8 { 8 } else { 16 }, entries)
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn name_of(
        &self,
        code: i16,
    ) -> Option<&str> {
        self.codes
            .iter()
            .position(|c| *c == code)
            .map(|i| self.names[i].as_str())
    }

    pub fn code_of(
        &self,
        name: &str,
    ) -> Option<i16> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.codes[i])
    }

    pub fn contains(
        &self,
        code: i16,
    ) -> bool {
        self.codes.contains(&code)
    }

    /// Первый объявленный код: значение Enum по умолчанию.
    pub fn first_code(&self) -> i16 {
        self.codes.first().copied().unwrap_or_default()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, i16)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.codes.iter().copied())
    }
}

impl fmt::Display for EnumDef {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Enum{}(", self.bits)?;
        for (i, (name, code)) in self.entries().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} = {code}", quote(name))?;
        }
        f.write_str(")")
    }
}

/// Заключает строку в одинарные кавычки, экранируя `\` и `'`.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
