//! Domain vocabulary shared by the aggregation, sync and HTTP layers.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Marketplace a sale was made on.
///
/// Declaration order is the chart stacking order: Amazon, then Rakuten, then Qoo10.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Mall {
    #[sea_orm(string_value = "amazon")]
    Amazon,
    #[sea_orm(string_value = "rakuten")]
    Rakuten,
    #[sea_orm(string_value = "qoo10")]
    Qoo10,
}

impl Mall {
    pub const ALL: [Mall; 3] = [Mall::Amazon, Mall::Rakuten, Mall::Qoo10];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mall::Amazon => "amazon",
            Mall::Rakuten => "rakuten",
            Mall::Qoo10 => "qoo10",
        }
    }
}

impl FromStr for Mall {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amazon" => Ok(Mall::Amazon),
            "rakuten" => Ok(Mall::Rakuten),
            "qoo10" => Ok(Mall::Qoo10),
            other => Err(ServiceError::ValidationError(format!(
                "Unknown mall '{}'; expected one of amazon, rakuten, qoo10",
                other
            ))),
        }
    }
}

/// Channel an advertising cost was spent on: the three malls' own ad programs
/// plus the two external platforms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AdChannel {
    Amazon,
    Rakuten,
    Qoo10,
    X,
    Tiktok,
}

impl AdChannel {
    pub const ALL: [AdChannel; 5] = [
        AdChannel::Amazon,
        AdChannel::Rakuten,
        AdChannel::Qoo10,
        AdChannel::X,
        AdChannel::Tiktok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdChannel::Amazon => "amazon",
            AdChannel::Rakuten => "rakuten",
            AdChannel::Qoo10 => "qoo10",
            AdChannel::X => "x",
            AdChannel::Tiktok => "tiktok",
        }
    }
}

impl From<Mall> for AdChannel {
    fn from(mall: Mall) -> Self {
        match mall {
            Mall::Amazon => AdChannel::Amazon,
            Mall::Rakuten => AdChannel::Rakuten,
            Mall::Qoo10 => AdChannel::Qoo10,
        }
    }
}

impl fmt::Display for AdChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdChannel {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amazon" => Ok(AdChannel::Amazon),
            "rakuten" => Ok(AdChannel::Rakuten),
            "qoo10" => Ok(AdChannel::Qoo10),
            "x" | "twitter" => Ok(AdChannel::X),
            "tiktok" => Ok(AdChannel::Tiktok),
            other => Err(ServiceError::ValidationError(format!(
                "Unknown ad channel '{}'; expected one of amazon, rakuten, qoo10, x, tiktok",
                other
            ))),
        }
    }
}

/// Inclusive calendar-day range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", try_from = "RawDateRange")]
pub struct DateRange {
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-01-31")]
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, ServiceError> {
        if start_date > end_date {
            return Err(ServiceError::ValidationError(format!(
                "startDate {} is after endDate {}",
                start_date, end_date
            )));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Both boundary days are included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ServiceError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start_date, raw.end_date)
    }
}

/// Which malls count toward "total sales".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MallSelection {
    pub amazon: bool,
    pub rakuten: bool,
    pub qoo10: bool,
}

impl MallSelection {
    pub fn all() -> Self {
        Self {
            amazon: true,
            rakuten: true,
            qoo10: true,
        }
    }

    pub fn none() -> Self {
        Self {
            amazon: false,
            rakuten: false,
            qoo10: false,
        }
    }

    pub fn only(malls: &[Mall]) -> Self {
        let mut selection = Self::none();
        for mall in malls {
            selection.set(*mall, true);
        }
        selection
    }

    pub fn includes(&self, mall: Mall) -> bool {
        match mall {
            Mall::Amazon => self.amazon,
            Mall::Rakuten => self.rakuten,
            Mall::Qoo10 => self.qoo10,
        }
    }

    pub fn set(&mut self, mall: Mall, selected: bool) {
        match mall {
            Mall::Amazon => self.amazon = selected,
            Mall::Rakuten => self.rakuten = selected,
            Mall::Qoo10 => self.qoo10 = selected,
        }
    }

    /// Parses a comma-separated list. `None` selects every mall, an empty string selects none.
    pub fn parse(raw: Option<&str>) -> Result<Self, ServiceError> {
        match raw {
            None => Ok(Self::all()),
            Some(raw) => Ok(Self::only(&parse_list::<Mall>(raw)?)),
        }
    }

    pub fn selected(&self) -> Vec<Mall> {
        Mall::ALL
            .into_iter()
            .filter(|mall| self.includes(*mall))
            .collect()
    }
}

impl Default for MallSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Which ad channels count toward "total ad cost".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdChannelSelection {
    pub amazon: bool,
    pub rakuten: bool,
    pub qoo10: bool,
    pub x: bool,
    pub tiktok: bool,
}

impl AdChannelSelection {
    pub fn all() -> Self {
        Self {
            amazon: true,
            rakuten: true,
            qoo10: true,
            x: true,
            tiktok: true,
        }
    }

    pub fn none() -> Self {
        Self {
            amazon: false,
            rakuten: false,
            qoo10: false,
            x: false,
            tiktok: false,
        }
    }

    pub fn only(channels: &[AdChannel]) -> Self {
        let mut selection = Self::none();
        for channel in channels {
            selection.set(*channel, true);
        }
        selection
    }

    pub fn includes(&self, channel: AdChannel) -> bool {
        match channel {
            AdChannel::Amazon => self.amazon,
            AdChannel::Rakuten => self.rakuten,
            AdChannel::Qoo10 => self.qoo10,
            AdChannel::X => self.x,
            AdChannel::Tiktok => self.tiktok,
        }
    }

    pub fn set(&mut self, channel: AdChannel, selected: bool) {
        match channel {
            AdChannel::Amazon => self.amazon = selected,
            AdChannel::Rakuten => self.rakuten = selected,
            AdChannel::Qoo10 => self.qoo10 = selected,
            AdChannel::X => self.x = selected,
            AdChannel::Tiktok => self.tiktok = selected,
        }
    }

    /// Same convention as [`MallSelection::parse`].
    pub fn parse(raw: Option<&str>) -> Result<Self, ServiceError> {
        match raw {
            None => Ok(Self::all()),
            Some(raw) => Ok(Self::only(&parse_list::<AdChannel>(raw)?)),
        }
    }
}

impl Default for AdChannelSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// `validator` hook rejecting empty or whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn parse_list<T>(raw: &str) -> Result<Vec<T>, ServiceError>
where
    T: FromStr<Err = ServiceError>,
{
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(T::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let range = DateRange::new(day("2024-01-01"), day("2024-01-31")).unwrap();
        assert!(range.contains(day("2024-01-01")));
        assert!(range.contains(day("2024-01-31")));
        assert!(!range.contains(day("2023-12-31")));
        assert!(!range.contains(day("2024-02-01")));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let result = DateRange::new(day("2024-02-01"), day("2024-01-01"));
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn deserializing_checks_range_order() {
        let range: DateRange =
            serde_json::from_str(r#"{"startDate":"2024-01-01","endDate":"2024-01-31"}"#).unwrap();
        assert_eq!(range.end_date, day("2024-01-31"));

        let err = serde_json::from_str::<DateRange>(
            r#"{"startDate":"2024-02-01","endDate":"2024-01-01"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("after endDate"));
    }

    #[rstest]
    #[case("amazon", Mall::Amazon)]
    #[case(" Rakuten ", Mall::Rakuten)]
    #[case("QOO10", Mall::Qoo10)]
    fn mall_names_parse_case_insensitively(#[case] raw: &str, #[case] expected: Mall) {
        assert_eq!(raw.parse::<Mall>().unwrap(), expected);
    }

    #[rstest]
    #[case("x", AdChannel::X)]
    #[case("twitter", AdChannel::X)]
    #[case("tiktok", AdChannel::Tiktok)]
    #[case("qoo10", AdChannel::Qoo10)]
    fn ad_channel_names_parse(#[case] raw: &str, #[case] expected: AdChannel) {
        assert_eq!(raw.parse::<AdChannel>().unwrap(), expected);
    }

    #[test]
    fn mall_selection_parsing() {
        assert_eq!(MallSelection::parse(None).unwrap(), MallSelection::all());
        assert_eq!(MallSelection::parse(Some("")).unwrap(), MallSelection::none());

        let selection = MallSelection::parse(Some(" Amazon, qoo10 ")).unwrap();
        assert!(selection.amazon);
        assert!(!selection.rakuten);
        assert!(selection.qoo10);
        assert_eq!(selection.selected(), vec![Mall::Amazon, Mall::Qoo10]);

        assert!(MallSelection::parse(Some("amazon,yahoo")).is_err());
    }

    #[test]
    fn ad_channel_selection_accepts_twitter_alias() {
        let selection = AdChannelSelection::parse(Some("twitter,tiktok")).unwrap();
        assert!(selection.x);
        assert!(selection.tiktok);
        assert!(!selection.amazon);
    }

    #[test]
    fn mall_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mall::Qoo10).unwrap(), "\"qoo10\"");
        assert_eq!(
            serde_json::from_str::<AdChannel>("\"tiktok\"").unwrap(),
            AdChannel::Tiktok
        );
    }
}
