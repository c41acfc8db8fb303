//! Locale-aware date, number, and currency formatting.
//!
//! Digits, separators, grouping, and date/time patterns come from ICU4X
//! compiled CLDR data, so any locale CLDR knows formats natively and unknown
//! tags fall back through the CLDR parent chain. `chrono` only parses input
//! values and applies time zones. Options mirror the platform formatting
//! option objects and deserialize from their camelCase keys.

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeDelta, TimeZone, Timelike, Utc,
};
use fixed_decimal::{Decimal, FloatPrecision, SignedRoundingMode, UnsignedRoundingMode};
use icu::calendar::{Date, Iso};
use icu::datetime::fieldsets;
use icu::datetime::input::{DateTime as IcuDateTime, Time};
use icu::datetime::options::{Length, YearStyle};
use icu::datetime::{DateTimeFormatter, NoCalendarFormatter};
use icu::decimal::options::{DecimalFormatterOptions, GroupingStrategy};
use icu::decimal::DecimalFormatter;
use icu::locale::Locale;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FormatError;
use crate::locale::normalize_locale;

const NBSP: &str = "\u{a0}";
const NNBSP: &str = "\u{202f}";

/// Largest timestamp magnitude a date value may carry (±100,000,000 days).
const MAX_TIMESTAMP_MS: i64 = 8_640_000_000_000_000;
const MAX_FRACTION_DIGITS: u8 = 20;

/// How far back, in hours, to look for the offset in effect before a skipped
/// wall-clock time.
const GAP_LOOKBACK_HOURS: i64 = 3;

const HALF_EXPAND: SignedRoundingMode = SignedRoundingMode::Unsigned(UnsignedRoundingMode::HalfExpand);

// ============================================================================
// Options
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberStyle {
    #[default]
    Decimal,
    Percent,
    Currency,
}

/// Number formatting options. Unset fields use the style's defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberFormatOptions {
    pub style: Option<NumberStyle>,
    /// ISO 4217 code, required for [`NumberStyle::Currency`].
    pub currency: Option<String>,
    pub minimum_fraction_digits: Option<u8>,
    pub maximum_fraction_digits: Option<u8>,
    pub use_grouping: Option<bool>,
}

impl NumberFormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: NumberStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    pub fn minimum_fraction_digits(mut self, n: u8) -> Self {
        self.minimum_fraction_digits = Some(n);
        self
    }

    pub fn maximum_fraction_digits(mut self, n: u8) -> Self {
        self.maximum_fraction_digits = Some(n);
        self
    }

    pub fn use_grouping(mut self, on: bool) -> Self {
        self.use_grouping = Some(on);
        self
    }

    /// Fields set in `self` win; unset fields come from `base`.
    fn over(&self, base: NumberFormatOptions) -> NumberFormatOptions {
        NumberFormatOptions {
            style: self.style.or(base.style),
            currency: self.currency.clone().or(base.currency),
            minimum_fraction_digits: self.minimum_fraction_digits.or(base.minimum_fraction_digits),
            maximum_fraction_digits: self.maximum_fraction_digits.or(base.maximum_fraction_digits),
            use_grouping: self.use_grouping.or(base.use_grouping),
        }
    }
}

/// Length of a date or time rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// Weekday and full month name.
    Full,
    /// Full month name; time with zone.
    Long,
    /// Abbreviated month name; time with seconds.
    Medium,
    /// Numeric; time without seconds.
    Short,
}

impl DateStyle {
    fn length(self) -> Length {
        match self {
            DateStyle::Full | DateStyle::Long => Length::Long,
            DateStyle::Medium => Length::Medium,
            DateStyle::Short => Length::Short,
        }
    }
}

/// Date formatting options.
///
/// With neither `date_style` nor `time_style` set, the date renders
/// numerically with a full year.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateFormatOptions {
    pub date_style: Option<DateStyle>,
    pub time_style: Option<DateStyle>,
    /// `"UTC"`, `"local"`, or a fixed offset such as `"+05:30"`. Defaults to
    /// the host's local time zone.
    pub time_zone: Option<String>,
    /// Force 12-hour (`true`) or 24-hour (`false`) time.
    pub hour12: Option<bool>,
}

impl DateFormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_style(mut self, style: DateStyle) -> Self {
        self.date_style = Some(style);
        self
    }

    pub fn time_style(mut self, style: DateStyle) -> Self {
        self.time_style = Some(style);
        self
    }

    pub fn time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = Some(tz.into());
        self
    }

    pub fn hour12(mut self, on: bool) -> Self {
        self.hour12 = Some(on);
        self
    }
}

// ============================================================================
// Date input
// ============================================================================

/// Anything `format_date` accepts: an instant, a millisecond timestamp, or
/// a date string.
#[derive(Clone, Debug, PartialEq)]
pub enum DateInput {
    Instant(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Text(String),
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(v: DateTime<Tz>) -> Self {
        Self::Instant(v.with_timezone(&Utc))
    }
}

impl From<NaiveDate> for DateInput {
    fn from(v: NaiveDate) -> Self {
        Self::Instant(v.and_time(NaiveTime::MIN).and_utc())
    }
}

impl From<i64> for DateInput {
    fn from(v: i64) -> Self {
        Self::Timestamp(v)
    }
}

impl From<&str> for DateInput {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for DateInput {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl DateInput {
    fn resolve(self) -> Result<DateTime<Utc>, FormatError> {
        match self {
            DateInput::Instant(dt) => Ok(dt),
            DateInput::Timestamp(ms) => {
                if ms.unsigned_abs() > MAX_TIMESTAMP_MS as u64 {
                    return Err(FormatError::InvalidDate(ms.to_string()));
                }
                DateTime::from_timestamp_millis(ms)
                    .ok_or_else(|| FormatError::InvalidDate(ms.to_string()))
            }
            DateInput::Text(s) => parse_date_text(&s, &Local).ok_or(FormatError::InvalidDate(s)),
        }
    }
}

/// Date-only strings are UTC; date-times without an offset are wall-clock
/// time in `local`.
fn parse_date_text<Tz: TimeZone>(s: &str, local: &Tz) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN).and_utc());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return wall_clock(local, naive);
        }
    }
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Resolve a wall-clock time in `tz`.
///
/// An ambiguous time (clocks turned back) takes the earlier instant. A time
/// skipped by a forward transition is read with the offset in effect before
/// the transition, which moves it forward by the length of the gap.
fn wall_clock<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt.with_timezone(&Utc));
    }
    let lookback = TimeDelta::hours(GAP_LOOKBACK_HOURS);
    let before = tz.from_local_datetime(&(naive - lookback)).earliest()?;
    Some((before + lookback).with_timezone(&Utc))
}

enum Zone {
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    fn parse(tz: Option<&str>) -> Result<Self, FormatError> {
        let Some(raw) = tz.map(str::trim) else {
            return Ok(Zone::Local);
        };
        match raw.to_ascii_lowercase().as_str() {
            "local" => return Ok(Zone::Local),
            "utc" | "etc/utc" | "gmt" | "z" => return Ok(Zone::Fixed(Utc.fix())),
            _ => {}
        }
        parse_offset(raw)
            .map(Zone::Fixed)
            .ok_or_else(|| FormatError::InvalidTimeZone(raw.to_string()))
    }

    fn apply(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => instant.with_timezone(&Local).fixed_offset(),
            Zone::Fixed(off) => instant.with_timezone(off),
        }
    }
}

/// `+hh:mm`, `-hh:mm`, `+hhmm`, or `+hh`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match *s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (h, m) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if h > 23 || m > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}

fn icu_datetime(dt: &DateTime<FixedOffset>) -> Result<IcuDateTime<Iso>, FormatError> {
    let invalid = || FormatError::InvalidDate(dt.to_rfc3339());
    let date = Date::try_new_iso(dt.year(), dt.month() as u8, dt.day() as u8)
        .map_err(|_| invalid())?;
    let time = Time::try_new(dt.hour() as u8, dt.minute() as u8, dt.second() as u8, 0)
        .map_err(|_| invalid())?;
    Ok(IcuDateTime { date, time })
}

// ============================================================================
// Formatter
// ============================================================================

/// Date, number, and currency formatting bound to one locale.
///
/// Pure: the output depends only on the locale, the value, and the options.
#[derive(Clone, Debug)]
pub struct LocaleFormatter {
    locale: String,
    icu: Locale,
}

/// Build the formatters for `locale`.
pub fn create_locale_formatter(locale: &str) -> LocaleFormatter {
    LocaleFormatter::new(locale)
}

impl LocaleFormatter {
    /// Tags ICU cannot parse format with root (`und`) conventions.
    pub fn new(locale: impl Into<String>) -> Self {
        let locale = locale.into();
        let icu = normalize_locale(&locale).parse().unwrap_or_else(|_| {
            debug!(locale = %locale, "unparseable locale tag, using root formatting data");
            Locale::UNKNOWN
        });
        Self { locale, icu }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn unsupported(&self) -> FormatError {
        FormatError::UnsupportedLocale(self.locale.clone())
    }

    /// The locale with an explicit `hc` keyword when the caller forces a clock.
    fn with_hour_cycle(&self, hour12: Option<bool>) -> Locale {
        let Some(h12) = hour12 else {
            return self.icu.clone();
        };
        let hc = if h12 { "h12" } else { "h23" };
        format!("{}-u-hc-{hc}", self.icu.id)
            .parse()
            .unwrap_or_else(|_| self.icu.clone())
    }

    /// Format a date value.
    ///
    /// Fails with [`FormatError::InvalidDate`] when `value` is not a valid date.
    pub fn format_date(
        &self,
        value: impl Into<DateInput>,
        options: &DateFormatOptions,
    ) -> Result<String, FormatError> {
        let instant = value.into().resolve()?;
        let dt = Zone::parse(options.time_zone.as_deref())?.apply(instant);
        let input = icu_datetime(&dt)?;
        let locale = self.with_hour_cycle(options.hour12);

        macro_rules! render {
            ($fields:expr) => {
                DateTimeFormatter::try_new(locale.clone().into(), $fields)
                    .map(|f| f.format(&input).to_string())
                    .map_err(|_| self.unsupported())?
            };
        }

        let (mut out, time_style) = match (options.date_style, options.time_style) {
            (None, None) => (
                render!(fieldsets::YMD::short().with_year_style(YearStyle::Full)),
                None,
            ),
            (Some(DateStyle::Full), None) => (render!(fieldsets::YMDE::long()), None),
            (Some(ds), None) => (render!(fieldsets::YMD::for_length(ds.length())), None),
            (None, Some(ts)) => {
                let fields = if ts == DateStyle::Short {
                    fieldsets::T::hm()
                } else {
                    fieldsets::T::hms()
                };
                let time = NoCalendarFormatter::try_new(locale.clone().into(), fields)
                    .map(|f| f.format(&input.time).to_string())
                    .map_err(|_| self.unsupported())?;
                (time, Some(ts))
            }
            (Some(DateStyle::Full), Some(ts)) => {
                let date = fieldsets::YMDE::long();
                let text = if ts == DateStyle::Short {
                    render!(date.with_time_hm())
                } else {
                    render!(date.with_time_hms())
                };
                (text, Some(ts))
            }
            (Some(ds), Some(ts)) => {
                let date = fieldsets::YMD::for_length(ds.length());
                let text = if ts == DateStyle::Short {
                    render!(date.with_time_hm())
                } else {
                    render!(date.with_time_hms())
                };
                (text, Some(ts))
            }
        };

        if matches!(time_style, Some(DateStyle::Long | DateStyle::Full)) {
            out.push(' ');
            out.push_str(&zone_label(dt.offset()));
        }
        Ok(out)
    }

    /// Format a number.
    pub fn format_number(
        &self,
        value: f64,
        options: &NumberFormatOptions,
    ) -> Result<String, FormatError> {
        let style = options.style.unwrap_or_default();
        let currency = match style {
            NumberStyle::Currency => Some(currency_code(options.currency.as_deref())?),
            _ => None,
        };
        let defaults = match (style, currency.as_deref()) {
            (NumberStyle::Percent, _) => (0, 0),
            (NumberStyle::Currency, Some(code)) => {
                let d = currency_digits(code);
                (d, d)
            }
            _ => (0, 3),
        };
        let (min, max) = fraction_digits(options, defaults)?;
        let scaled = match style {
            NumberStyle::Percent => value * 100.0,
            _ => value,
        };

        let body = if scaled.is_nan() {
            "NaN".to_string()
        } else if scaled.is_infinite() {
            "∞".to_string()
        } else {
            self.digits(scaled.abs(), min, max, options.use_grouping.unwrap_or(true))?
        };
        let sign = if scaled.is_sign_negative() && !scaled.is_nan() {
            "-"
        } else {
            ""
        };

        let affixes = Affixes::of(&self.icu);
        Ok(match (style, currency) {
            (NumberStyle::Percent, _) => format!("{sign}{body}{}%", affixes.percent_gap),
            (NumberStyle::Currency, Some(code)) => {
                let symbol = currency_symbol(&code);
                let gap = if affixes.currency_gap.is_empty()
                    && symbol.chars().last().is_some_and(char::is_alphabetic)
                {
                    NBSP
                } else {
                    affixes.currency_gap
                };
                if affixes.currency_after {
                    format!("{sign}{body}{gap}{symbol}")
                } else {
                    format!("{sign}{symbol}{gap}{body}")
                }
            }
            _ => format!("{sign}{body}"),
        })
    }

    /// Format a currency amount.
    ///
    /// `options` fields override the currency style defaults, including
    /// `style` and `currency` themselves.
    pub fn format_currency(
        &self,
        value: f64,
        currency: &str,
        options: &NumberFormatOptions,
    ) -> Result<String, FormatError> {
        let merged = options.over(
            NumberFormatOptions::new()
                .style(NumberStyle::Currency)
                .currency(currency),
        );
        self.format_number(value, &merged)
    }

    /// Locale digits for a finite, non-negative value rounded to at most
    /// `max` and padded to at least `min` fraction digits.
    fn digits(&self, abs: f64, min: u8, max: u8, grouping: bool) -> Result<String, FormatError> {
        let mut decimal = Decimal::try_from_f64(abs, FloatPrecision::RoundTrip)
            .map_err(|_| FormatError::InvalidNumber(abs.to_string()))?;
        let limit = -i16::from(max);
        if *decimal.magnitude_range().start() < limit {
            decimal.round_with_mode(limit, HALF_EXPAND);
        }
        decimal.trim_end();
        decimal.pad_end(-i16::from(min));

        let mut options = DecimalFormatterOptions::default();
        if !grouping {
            options.grouping_strategy = Some(GroupingStrategy::Never);
        }
        let formatter = DecimalFormatter::try_new(self.icu.clone().into(), options)
            .map_err(|_| self.unsupported())?;
        Ok(formatter.format(&decimal).to_string())
    }
}

/// Currency and percent sign placement. The stable ICU4X API formats bare
/// decimals only, so the affix patterns are kept here per language.
struct Affixes {
    currency_after: bool,
    currency_gap: &'static str,
    percent_gap: &'static str,
}

impl Affixes {
    fn of(locale: &Locale) -> Self {
        let lang = locale.id.language.as_str();
        let region = locale.id.region.as_ref().map(|r| r.as_str());
        let suffixed = Affixes {
            currency_after: true,
            currency_gap: NBSP,
            percent_gap: NBSP,
        };
        match (lang, region) {
            ("de", Some("CH" | "LI")) => Affixes {
                currency_after: false,
                currency_gap: NBSP,
                percent_gap: "",
            },
            ("pt", Some("PT")) => suffixed,
            ("fr", _) => Affixes {
                percent_gap: NNBSP,
                ..suffixed
            },
            ("it", _) => Affixes {
                percent_gap: "",
                ..suffixed
            },
            (
                "de" | "es" | "ca" | "ru" | "uk" | "be" | "pl" | "cs" | "sk" | "sl" | "hr" | "sr"
                | "bs" | "bg" | "ro" | "hu" | "fi" | "et" | "lv" | "lt" | "sv" | "nb" | "no" | "nn"
                | "da" | "is" | "el",
                _,
            ) => suffixed,
            ("nl" | "pt", _) => Affixes {
                currency_after: false,
                currency_gap: NBSP,
                percent_gap: "",
            },
            _ => Affixes {
                currency_after: false,
                currency_gap: "",
                percent_gap: "",
            },
        }
    }
}

fn zone_label(offset: &FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    if secs == 0 {
        return "UTC".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let (h, m) = (secs.abs() / 3600, (secs.abs() % 3600) / 60);
    if m == 0 {
        format!("GMT{sign}{h}")
    } else {
        format!("GMT{sign}{h}:{m:02}")
    }
}

fn currency_code(code: Option<&str>) -> Result<String, FormatError> {
    let code = code.ok_or(FormatError::MissingCurrency)?.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FormatError::InvalidCurrency(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

/// ISO 4217 minor units.
fn currency_digits(code: &str) -> u8 {
    match code {
        "JPY" | "KRW" | "VND" | "CLP" | "ISK" | "UGX" | "PYG" | "XAF" | "XOF" => 0,
        "BHD" | "KWD" | "OMR" | "JOD" | "TND" => 3,
        _ => 2,
    }
}

/// Common symbols; other currencies render as their code.
fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "\u{20ac}",
        "GBP" => "\u{00a3}",
        "JPY" | "CNY" => "\u{00a5}",
        "KRW" => "\u{20a9}",
        "INR" => "\u{20b9}",
        "RUB" => "\u{20bd}",
        "TRY" => "\u{20ba}",
        "BRL" => "R$",
        "CAD" => "CA$",
        "AUD" => "A$",
        "MXN" => "MX$",
        other => other,
    }
}

fn fraction_digits(opts: &NumberFormatOptions, defaults: (u8, u8)) -> Result<(u8, u8), FormatError> {
    let (dmin, dmax) = defaults;
    let min = opts
        .minimum_fraction_digits
        .unwrap_or_else(|| dmin.min(opts.maximum_fraction_digits.unwrap_or(dmin)));
    let max = opts.maximum_fraction_digits.unwrap_or_else(|| dmax.max(min));
    if min > max || max > MAX_FRACTION_DIGITS {
        return Err(FormatError::FractionDigits { min, max });
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::LocalResult;
    use pretty_assertions::assert_eq;

    fn utc() -> DateFormatOptions {
        DateFormatOptions::new().time_zone("UTC")
    }

    fn num(locale: &str, v: f64) -> String {
        LocaleFormatter::new(locale)
            .format_number(v, &NumberFormatOptions::default())
            .unwrap()
    }

    fn cur(locale: &str, v: f64, code: &str) -> String {
        LocaleFormatter::new(locale)
            .format_currency(v, code, &NumberFormatOptions::default())
            .unwrap()
    }

    #[test]
    fn numbers_use_cldr_separators_and_grouping() {
        assert_eq!(num("en-US", 1234567.891), "1,234,567.891");
        assert_eq!(num("de-DE", 1234567.891), "1.234.567,891");
        assert_eq!(num("tr-TR", 1234567.891), "1.234.567,891");
        assert_eq!(num("en-IN", 1234567.891), "12,34,567.891");
        assert_eq!(num("fr", 1234567.5), "1\u{202f}234\u{202f}567,5");
        assert_eq!(num("de-CH", 1234.5), "1\u{2019}234.5");
        assert_eq!(num("ru", 1234.5), "1\u{a0}234,5");
    }

    #[test]
    fn posix_style_tags_are_accepted() {
        assert_eq!(num("de_DE.UTF-8", 1234.5), "1.234,5");
    }

    #[test]
    fn spanish_skips_grouping_for_four_digits() {
        assert_eq!(num("es", 1234.5), "1234,5");
        assert_eq!(num("es", 12345.5), "12.345,5");
    }

    #[test]
    fn numbers_round_half_away_from_zero() {
        assert_eq!(num("en", 0.0005), "0.001");
        assert_eq!(num("en", 2.0), "2");
        assert_eq!(num("en", -1.23456), "-1.235");
        assert_eq!(num("en", 999.9996), "1,000");

        let f = LocaleFormatter::new("en");
        let two = NumberFormatOptions::new().maximum_fraction_digits(2);
        assert_eq!(f.format_number(0.125, &two).unwrap(), "0.13");
        assert_eq!(f.format_number(9.999, &two).unwrap(), "10");
    }

    #[test]
    fn number_options() {
        let f = LocaleFormatter::new("en-US");
        let fixed = NumberFormatOptions::new().minimum_fraction_digits(2);
        assert_eq!(f.format_number(5.0, &fixed).unwrap(), "5.00");

        let plain = NumberFormatOptions::new().use_grouping(false);
        assert_eq!(f.format_number(12345.0, &plain).unwrap(), "12345");

        let pct = NumberFormatOptions::new().style(NumberStyle::Percent);
        assert_eq!(f.format_number(0.256, &pct).unwrap(), "26%");
        assert_eq!(
            LocaleFormatter::new("de").format_number(0.256, &pct).unwrap(),
            "26\u{a0}%"
        );

        assert_eq!(f.format_number(f64::NAN, &plain).unwrap(), "NaN");
        assert_eq!(f.format_number(f64::NEG_INFINITY, &plain).unwrap(), "-∞");
    }

    #[test]
    fn invalid_number_options_fail() {
        let f = LocaleFormatter::new("en");
        let bad = NumberFormatOptions::new()
            .minimum_fraction_digits(3)
            .maximum_fraction_digits(1);
        assert_eq!(
            f.format_number(1.0, &bad),
            Err(FormatError::FractionDigits { min: 3, max: 1 })
        );

        let no_code = NumberFormatOptions::new().style(NumberStyle::Currency);
        assert_eq!(f.format_number(1.0, &no_code), Err(FormatError::MissingCurrency));
    }

    #[test]
    fn currency_placement_and_digits() {
        assert_eq!(cur("en-US", 1234.5, "USD"), "$1,234.50");
        assert_eq!(cur("en-US", -5.0, "usd"), "-$5.00");
        assert_eq!(cur("de-DE", 1234.5, "EUR"), "1.234,50\u{a0}€");
        assert_eq!(cur("nl", 1234.5, "EUR"), "€\u{a0}1.234,50");
        assert_eq!(cur("tr-TR", 1234.5, "TRY"), "₺1.234,50");
        assert_eq!(cur("ja-JP", 1234.5, "JPY"), "¥1,235");
        assert_eq!(cur("en", 12.0, "CHF"), "CHF\u{a0}12.00");
    }

    #[test]
    fn currency_rejects_malformed_codes() {
        let f = LocaleFormatter::new("en");
        let opts = NumberFormatOptions::default();
        assert_eq!(
            f.format_currency(1.0, "DOLLARS", &opts),
            Err(FormatError::InvalidCurrency("DOLLARS".into()))
        );
    }

    #[test]
    fn caller_options_override_currency_defaults() {
        let f = LocaleFormatter::new("en-US");
        let whole = NumberFormatOptions::new().maximum_fraction_digits(0);
        assert_eq!(f.format_currency(1234.5, "USD", &whole).unwrap(), "$1,235");

        let euros = NumberFormatOptions::new().currency("EUR");
        assert_eq!(f.format_currency(3.0, "USD", &euros).unwrap(), "€3.00");

        let decimal = NumberFormatOptions::new().style(NumberStyle::Decimal);
        assert_eq!(f.format_currency(1234.5, "USD", &decimal).unwrap(), "1,234.5");
    }

    #[test]
    fn options_deserialize_from_camel_case() {
        let opts: NumberFormatOptions = serde_json::from_str(
            r#"{ "style": "currency", "currency": "EUR", "maximumFractionDigits": 0 }"#,
        )
        .unwrap();
        assert_eq!(opts.style, Some(NumberStyle::Currency));
        assert_eq!(opts.maximum_fraction_digits, Some(0));

        let d: DateFormatOptions =
            serde_json::from_str(r#"{ "dateStyle": "long", "timeZone": "UTC" }"#).unwrap();
        assert_eq!(d.date_style, Some(DateStyle::Long));
    }

    #[test]
    fn default_date_is_numeric_with_full_year() {
        let fmt = |l: &str| LocaleFormatter::new(l).format_date("2024-01-05", &utc()).unwrap();
        assert_eq!(fmt("en-US"), "1/5/2024");
        assert_eq!(fmt("en-GB"), "05/01/2024");
    }

    #[test]
    fn date_styles() {
        let fmt = |l: &str, s: DateStyle| {
            LocaleFormatter::new(l)
                .format_date("2024-01-05", &utc().date_style(s))
                .unwrap()
        };
        assert_eq!(fmt("en-US", DateStyle::Long), "January 5, 2024");
        assert_eq!(fmt("en-US", DateStyle::Medium), "Jan 5, 2024");
        assert_eq!(fmt("en-US", DateStyle::Full), "Friday, January 5, 2024");
        assert_eq!(fmt("de-DE", DateStyle::Long), "5. Januar 2024");
        assert_eq!(fmt("ja", DateStyle::Long), "2024年1月5日");

        // Locales outside any hand-kept list still get their own month names.
        let hi = fmt("hi-IN", DateStyle::Long);
        assert!(hi.contains("2024"), "{hi}");
        assert!(!hi.contains("January"), "{hi}");
        let tr = fmt("tr-TR", DateStyle::Long);
        assert!(tr.contains("Ocak"), "{tr}");
    }

    #[test]
    fn times_and_zones() {
        let at = "2024-01-15T15:45:30Z";
        let en = LocaleFormatter::new("en-US");
        let de = LocaleFormatter::new("de-DE");
        let short = utc().time_style(DateStyle::Short);

        let en_short = en.format_date(at, &short).unwrap();
        assert!(en_short.starts_with("3:45"), "{en_short}");
        assert!(en_short.ends_with("PM"), "{en_short}");
        assert_eq!(de.format_date(at, &short).unwrap(), "15:45");
        assert_eq!(
            en.format_date(at, &short.clone().hour12(false)).unwrap(),
            "15:45"
        );

        let medium = en.format_date(at, &utc().time_style(DateStyle::Medium)).unwrap();
        assert!(medium.starts_with("3:45:30"), "{medium}");

        let shifted = DateFormatOptions::new()
            .time_zone("+05:30")
            .date_style(DateStyle::Short)
            .time_style(DateStyle::Long);
        let both = en.format_date(at, &shifted).unwrap();
        assert!(both.contains("1/15/24"), "{both}");
        assert!(both.contains("9:15:30"), "{both}");
        assert!(both.ends_with(" GMT+5:30"), "{both}");

        assert_eq!(
            en.format_date(at, &DateFormatOptions::new().time_zone("Mars/Olympus")),
            Err(FormatError::InvalidTimeZone("Mars/Olympus".into()))
        );
    }

    #[test]
    fn accepts_timestamps_and_instants() {
        let f = LocaleFormatter::new("en-US");
        assert_eq!(f.format_date(0_i64, &utc()).unwrap(), "1/1/1970");

        let instant = Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(f.format_date(instant, &utc()).unwrap(), "12/31/2023");

        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(f.format_date(date, &utc()).unwrap(), "2/29/2020");
    }

    #[test]
    fn invalid_dates_fail() {
        let f = LocaleFormatter::new("en-US");
        assert_eq!(
            f.format_date("not a date", &utc()),
            Err(FormatError::InvalidDate("not a date".into()))
        );
        assert!(matches!(
            f.format_date("", &utc()),
            Err(FormatError::InvalidDate(_))
        ));
        assert!(matches!(
            f.format_date(i64::MAX, &utc()),
            Err(FormatError::InvalidDate(_))
        ));
    }

    /// UTC-5, switching to UTC-4 at 2024-03-10 02:00 local time.
    #[derive(Clone, Copy, Debug)]
    struct SpringForward;

    impl SpringForward {
        fn standard() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }

        fn daylight() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn gap_start() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(2, 0, 0)
                .unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, _: &NaiveDate) -> LocalResult<FixedOffset> {
            LocalResult::Single(Self::standard())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let start = Self::gap_start();
            if *local < start {
                LocalResult::Single(Self::standard())
            } else if *local < start + TimeDelta::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::daylight())
            }
        }

        fn offset_from_utc_date(&self, _: &NaiveDate) -> FixedOffset {
            Self::standard()
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::gap_start() + TimeDelta::hours(5) {
                Self::standard()
            } else {
                Self::daylight()
            }
        }
    }

    #[test]
    fn skipped_wall_clock_time_moves_forward() {
        let parsed = |s: &str| parse_date_text(s, &SpringForward).unwrap();

        assert_eq!(
            parsed("2024-03-10T01:30:00"),
            Utc.with_ymd_and_hms(2024, 3, 10, 6, 30, 0).unwrap()
        );
        // 02:30 does not exist; it reads as 03:30 daylight time.
        assert_eq!(
            parsed("2024-03-10T02:30:00"),
            Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap()
        );
        assert_eq!(
            parsed("2024-03-10T03:30:00"),
            Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap()
        );
    }
}
