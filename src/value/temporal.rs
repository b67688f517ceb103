//! Арифметика дат и времени для значений с масштабом.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;
/// Кол-во дней от 0001-01-01 до 1970-01-01.
const UNIX_EPOCH_DAY_FROM_CE: i64 = 719_163;

pub(crate) fn epoch_date() -> NaiveDate {
    NaiveDate::default()
}

pub(crate) fn epoch_date_time() -> NaiveDateTime {
    NaiveDateTime::default()
}

/// 10^n для n <= 18.
pub(crate) fn pow10(n: u32) -> i64 {
    10i64.pow(n.min(18))
}

pub(crate) fn epoch_day(date: NaiveDate) -> i64 {
    date.signed_duration_since(epoch_date()).num_days()
}

pub(crate) fn date_from_epoch_day(day: i64) -> Option<NaiveDate> {
    let ce = day.checked_add(UNIX_EPOCH_DAY_FROM_CE)?;
    NaiveDate::from_num_days_from_ce_opt(i32::try_from(ce).ok()?)
}

pub(crate) fn epoch_second(dt: &NaiveDateTime) -> i64 {
    dt.and_utc().timestamp()
}

pub(crate) fn date_time_from_parts(
    seconds: i64,
    nanos: u32,
) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(seconds, nanos).map(|d| d.naive_utc())
}

/// Отбрасывает наносекунды, которые не помещаются в масштаб.
pub(crate) fn truncate_nanos(
    nanos: u32,
    scale: u32,
) -> u32 {
    if scale >= 9 {
        return nanos;
    }
    let unit = pow10(9 - scale) as u32;
    nanos - nanos % unit
}

pub(crate) fn truncate_date_time(
    dt: NaiveDateTime,
    scale: u32,
) -> NaiveDateTime {
    let nanos = truncate_nanos(dt.nanosecond(), scale);
    dt.with_nanosecond(nanos).unwrap_or(dt)
}

/// Тики с масштабом `scale` -> момент UTC.
pub(crate) fn date_time_from_ticks(
    ticks: i64,
    scale: u32,
) -> Option<NaiveDateTime> {
    let unit = pow10(scale.min(9));
    let seconds = ticks.div_euclid(unit);
    let frac = ticks.rem_euclid(unit);
    let nanos = frac.checked_mul(pow10(9 - scale.min(9)))?;
    date_time_from_parts(seconds, u32::try_from(nanos).ok()?)
}

/// Момент UTC -> тики с масштабом `scale`.
pub(crate) fn date_time_to_ticks(
    dt: &NaiveDateTime,
    scale: u32,
) -> Option<i64> {
    let scale = scale.min(9);
    let seconds = epoch_second(dt);
    let frac = dt.nanosecond() as i64 / pow10(9 - scale);
    seconds.checked_mul(pow10(scale))?.checked_add(frac)
}

/// Дробная часть минимальной длины (без хвостовых нулей), пустая строка
/// при нулевых наносекундах или нулевом масштабе.
pub(crate) fn format_fraction(
    nanos: u32,
    scale: u32,
) -> String {
    if scale == 0 || nanos == 0 {
        return String::new();
    }
    let digits = format!("{nanos:09}");
    let digits = digits[..scale.min(9) as usize].trim_end_matches('0');
    if digits.is_empty() {
        String::new()
    } else {
        format!(".{digits}")
    }
}

pub(crate) fn format_date_time(
    dt: &NaiveDateTime,
    scale: u32,
) -> String {
    format!(
        "{}{}",
        dt.format("%Y-%m-%d %H:%M:%S"),
        format_fraction(dt.nanosecond(), scale)
    )
}

/// `[-]HH:MM:SS[.f]`; часы могут превышать 24.
pub(crate) fn format_time(
    nanos: i64,
    scale: u32,
) -> String {
    let sign = if nanos < 0 { "-" } else { "" };
    let abs = nanos.unsigned_abs();
    let total_seconds = abs / NANOS_PER_SECOND as u64;
    let frac = (abs % NANOS_PER_SECOND as u64) as u32;
    format!(
        "{sign}{:02}:{:02}:{:02}{}",
        total_seconds / 3600,
        (total_seconds / 60) % 60,
        total_seconds % 60,
        format_fraction(frac, scale)
    )
}

/// Разбирает `[-]H+:MM[:SS[.f]]` в наносекунды.
pub(crate) fn parse_time(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (clock, frac) = match body.split_once('.') {
        Some((c, f)) => (c, Some(f)),
        None => (body, None),
    };

    let mut parts = clock.split(':');
    let hours: i64 = parse_digits(parts.next()?)?;
    let minutes: i64 = parse_digits(parts.next()?)?;
    let seconds: i64 = match parts.next() {
        Some(s) => parse_digits(s)?,
        None => 0,
    };
    if parts.next().is_some() || minutes > 59 || seconds > 59 {
        return None;
    }

    let mut nanos = match frac {
        Some(f) if !f.is_empty() && f.len() <= 9 => {
            parse_digits::<i64>(f)? * pow10(9 - f.len() as u32)
        }
        Some(_) => return None,
        None => 0,
    };
    nanos = hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)?
        .checked_mul(NANOS_PER_SECOND)?
        .checked_add(nanos)?;

    Some(if negative { -nanos } else { nanos })
}

fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Разбирает дату-время в нескольких распространённых форматах.
pub(crate) fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| parse_date(text).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}
