//! Multi-day forecast document and the queries answered from it.
//!
//! The document mirrors the forecast service's GeoJSON feature. Periods arrive in
//! chronological order, alternating day and night windows, and every query here
//! relies on that order as delivered. Nothing in this module re-sorts periods.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Returned by [`Forecast::rain_chance_summary`] when no period in range carries
/// a precipitation chance.
pub const NO_PRECIPITATION: &str = "No precipitation expected in the next few days.";

/// Periods scanned for precipitation: about three days of day + night pairs.
const RAIN_LOOKAHEAD: usize = 6;

pub const DEFAULT_RANGE_DAYS: usize = 3;

/// A forecast document as delivered. Read-only once parsed: fields are only
/// exposed through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(rename = "type")]
    kind: String,
    geometry: Geometry,
    properties: ForecastProperties,
}

/// Forecast area polygon. Carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastProperties {
    units: String,
    forecast_generator: String,
    generated_at: DateTime<FixedOffset>,
    update_time: DateTime<FixedOffset>,
    valid_times: String,
    elevation: Measurement,
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    unit_code: String,
    value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probability {
    unit_code: String,
    value: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    number: u32,
    name: String,
    start_time: DateTime<FixedOffset>,
    end_time: DateTime<FixedOffset>,
    is_daytime: bool,
    temperature: i32,
    temperature_unit: String,
    /// "rising", "falling", or absent. The service sends `null` for most periods.
    #[serde(default)]
    temperature_trend: Option<String>,
    probability_of_precipitation: Probability,
    wind_speed: String,
    wind_direction: String,
    icon: String,
    short_forecast: String,
    detailed_forecast: String,
}

impl Geometry {
    /// GeoJSON geometry type, e.g. "Polygon".
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn coordinates(&self) -> &[Vec<Vec<f64>>] {
        &self.coordinates
    }
}

impl ForecastProperties {
    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn forecast_generator(&self) -> &str {
        &self.forecast_generator
    }

    pub fn generated_at(&self) -> DateTime<FixedOffset> {
        self.generated_at
    }

    pub fn update_time(&self) -> DateTime<FixedOffset> {
        self.update_time
    }

    /// ISO 8601 interval the forecast is valid for.
    pub fn valid_times(&self) -> &str {
        &self.valid_times
    }

    pub fn elevation(&self) -> &Measurement {
        &self.elevation
    }
}

impl Measurement {
    pub fn unit_code(&self) -> &str {
        &self.unit_code
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl Probability {
    pub fn unit_code(&self) -> &str {
        &self.unit_code
    }

    pub fn value(&self) -> Option<u8> {
        self.value
    }
}

impl ForecastPeriod {
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_time(&self) -> DateTime<FixedOffset> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<FixedOffset> {
        self.end_time
    }

    pub fn is_daytime(&self) -> bool {
        self.is_daytime
    }

    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    pub fn temperature_unit(&self) -> &str {
        &self.temperature_unit
    }

    pub fn temperature_trend(&self) -> Option<&str> {
        self.temperature_trend.as_deref()
    }

    pub fn probability_of_precipitation(&self) -> &Probability {
        &self.probability_of_precipitation
    }

    /// Precipitation chance in percent, if the service reported a non-zero one.
    pub fn precipitation_chance(&self) -> Option<u8> {
        self.probability_of_precipitation.value.filter(|pct| *pct > 0)
    }

    pub fn wind_speed(&self) -> &str {
        &self.wind_speed
    }

    pub fn wind_direction(&self) -> &str {
        &self.wind_direction
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn short_forecast(&self) -> &str {
        &self.short_forecast
    }

    pub fn detailed_forecast(&self) -> &str {
        &self.detailed_forecast
    }

    /// e.g. "Sunny, 75°F"
    pub fn headline(&self) -> String {
        format!("{}, {}°{}", self.short_forecast, self.temperature, self.temperature_unit)
    }
}

/// High/low for one day, pairing a daytime period with a nighttime one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub day: String,
    pub high: i32,
    pub low: i32,
    pub unit: String,
}

type PeriodRule = fn(&ForecastPeriod) -> bool;
type PeriodPick = for<'a> fn(&'a [ForecastPeriod]) -> Option<&'a ForecastPeriod>;

const TODAY_RULES: &[PeriodRule] = &[is_named_today, any_period];
const TONIGHT_RULES: &[PeriodRule] = &[is_named_tonight, is_night];
const TOMORROW_PICKS: &[PeriodPick] = &[two_after_today, first_past_tonight];

fn is_named_today(period: &ForecastPeriod) -> bool {
    period.name == "Today"
}

fn is_named_tonight(period: &ForecastPeriod) -> bool {
    period.name == "Tonight"
}

fn is_night(period: &ForecastPeriod) -> bool {
    !period.is_daytime
}

fn any_period(_: &ForecastPeriod) -> bool {
    true
}

/// Names the service uses for the first daytime window, depending on the hour.
fn is_today_anchor(period: &ForecastPeriod) -> bool {
    matches!(period.name.as_str(), "Today" | "This Afternoon")
}

/// Skip the day and night windows of today: anchor at i, tomorrow at i + 2.
///
/// This trusts the service's day/night alternation; if it ever inserts an extra
/// window (e.g. "Overnight") between them, the pick lands one period early.
fn two_after_today(periods: &[ForecastPeriod]) -> Option<&ForecastPeriod> {
    periods
        .iter()
        .enumerate()
        .find(|&(i, period)| is_today_anchor(period) && i + 2 < periods.len())
        .and_then(|(i, _)| periods.get(i + 2))
}

fn first_past_tonight(periods: &[ForecastPeriod]) -> Option<&ForecastPeriod> {
    periods
        .iter()
        .find(|period| !matches!(period.name.as_str(), "Today" | "Tonight"))
}

impl Forecast {
    /// Always "Feature".
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn properties(&self) -> &ForecastProperties {
        &self.properties
    }

    /// Periods in the order the service delivered them.
    pub fn periods(&self) -> &[ForecastPeriod] {
        &self.properties.periods
    }

    fn first_matching(&self, rules: &[PeriodRule]) -> Option<&ForecastPeriod> {
        rules.iter().find_map(|rule| self.periods().iter().find(|&period| rule(period)))
    }

    /// The "Today" period, or the first period when the service has already
    /// rolled over to the evening. `None` only for an empty forecast.
    pub fn today(&self) -> Option<&ForecastPeriod> {
        self.first_matching(TODAY_RULES)
    }

    pub fn tonight(&self) -> Option<&ForecastPeriod> {
        self.first_matching(TONIGHT_RULES)
    }

    pub fn tomorrow(&self) -> Option<&ForecastPeriod> {
        TOMORROW_PICKS.iter().find_map(|pick| pick(self.periods()))
    }

    /// Daytime periods after today, at most `days` of them.
    pub fn next_days(&self, days: usize) -> Vec<&ForecastPeriod> {
        self.periods()
            .iter()
            .filter(|period| period.is_daytime)
            .skip(1)
            .take(days)
            .collect()
    }

    pub fn rain_chance_summary(&self) -> String {
        let lines: Vec<String> = self
            .periods()
            .iter()
            .take(RAIN_LOOKAHEAD)
            .filter_map(|period| {
                period
                    .precipitation_chance()
                    .map(|pct| format!("{}: {}% chance of precipitation", period.name, pct))
            })
            .collect();

        if lines.is_empty() {
            NO_PRECIPITATION.to_string()
        } else {
            lines.join("\n")
        }
    }

    /// Pair the first `limit` daytime periods with the first `limit` nighttime
    /// periods by position. Pairs are not matched by date.
    pub fn temperature_range(&self, limit: usize) -> Vec<TemperatureRange> {
        let days = self.periods().iter().filter(|p| p.is_daytime).take(limit);
        let nights = self.periods().iter().filter(|p| !p.is_daytime).take(limit);

        days.zip(nights)
            .map(|(day, night)| TemperatureRange {
                day: day.name.clone(),
                high: day.temperature,
                low: night.temperature,
                unit: day.temperature_unit.clone(),
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        if let Some(today) = self.today() {
            lines.push(format!("Today: {}", today.headline()));
            lines.push(format!("Wind: {} {}", today.wind_speed, today.wind_direction));
        }

        if let Some(tonight) = self.tonight() {
            lines.push(format!("\nTonight: {}", tonight.headline()));
        }

        if let Some(tomorrow) = self.tomorrow() {
            lines.push(format!("\nTomorrow: {}", tomorrow.headline()));
        }

        let rain = self.rain_chance_summary();
        if rain != NO_PRECIPITATION {
            lines.push(format!("\nPrecipitation Chances:\n{rain}"));
        }

        lines.join("\n")
    }
}
