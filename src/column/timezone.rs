use std::fmt;

use chrono::{FixedOffset, Offset, Utc};

/// Часовой пояс колонки DateTime/Time.
///
/// Сохраняет исходное имя для вывода, а вычисления ведёт по фиксированному
/// смещению от UTC. Имена, которые не удалось разрешить, вычисляются как
/// UTC.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeZone {
    name: String,
    offset: FixedOffset,
}

/// Имена, эквивалентные UTC.
const UTC_ALIASES: &[&str] = &[
    "UTC",
    "GMT",
    "Z",
    "UCT",
    "Etc/UTC",
    "Etc/GMT",
    "Etc/UCT",
    "Etc/Universal",
    "Etc/Zulu",
    "Universal",
    "Zulu",
];

impl TimeZone {
    pub fn utc() -> Self {
        Self {
            name: "UTC".to_string(),
            offset: utc_offset(),
        }
    }

    /// Создаёт пояс с явным смещением (в секундах к востоку от UTC).
    pub fn fixed(
        name: impl Into<String>,
        offset_seconds: i32,
    ) -> Option<Self> {
        FixedOffset::east_opt(offset_seconds).map(|offset| Self {
            name: name.into(),
            offset,
        })
    }

    /// Разрешает имя пояса. Никогда не падает: неизвестное имя сохраняется,
    /// но вычисляется как UTC.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if UTC_ALIASES.iter().any(|a| a.eq_ignore_ascii_case(name)) {
            return Self {
                name: name.to_string(),
                offset: utc_offset(),
            };
        }

        match parse_offset(name) {
            Some(offset) => Self {
                name: name.to_string(),
                offset,
            },
            None => {
                tracing::warn!(
                    timezone = name,
                    "Unknown timezone, values are evaluated as UTC"
                );
                Self {
                    name: name.to_string(),
                    offset: utc_offset(),
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn is_utc(&self) -> bool {
        self.offset.local_minus_utc() == 0
    }
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for TimeZone {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Разбирает `±HH[:MM]`, `UTC±H[:MM]` и `GMT±H[:MM]`.
fn parse_offset(name: &str) -> Option<FixedOffset> {
    let rest = ["UTC", "GMT"]
        .iter()
        .find_map(|p| {
            name.get(..p.len())
                .filter(|head| head.eq_ignore_ascii_case(p))
                .map(|_| &name[p.len()..])
        })
        .unwrap_or(name);

    let (sign, digits) = match rest.as_bytes().first()? {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };

    if hours.is_empty() || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("UTC", 0)]
    #[case("Etc/UTC", 0)]
    #[case("zulu", 0)]
    #[case("+03:00", 3 * 3600)]
    #[case("-0530", -(5 * 3600 + 30 * 60))]
    #[case("UTC+8", 8 * 3600)]
    #[case("GMT-2:30", -(2 * 3600 + 30 * 60))]
    fn test_known_zones(
        #[case] name: &str,
        #[case] seconds: i32,
    ) {
        let tz = TimeZone::parse(name);
        assert_eq!(tz.offset().local_minus_utc(), seconds, "zone: {name}");
        assert_eq!(tz.name(), name);
    }

    /// Тест проверяет, что неизвестный пояс сохраняет имя и считается UTC.
    #[test]
    fn test_unknown_zone_falls_back_to_utc() {
        let tz = TimeZone::parse("Mars/Olympus_Mons");
        assert!(tz.is_utc());
        assert_eq!(tz.to_string(), "Mars/Olympus_Mons");
        assert_ne!(tz, TimeZone::utc());
    }

    #[test]
    fn test_invalid_offsets() {
        for name in ["+25", "+", "UTC+x", "+1:99"] {
            assert!(TimeZone::parse(name).is_utc(), "zone: {name}");
        }
        assert!(TimeZone::fixed("X", 100_000).is_none());
    }
}
