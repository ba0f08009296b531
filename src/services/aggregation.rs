//! Turns stored daily sales rows and event flags into chart-ready series.
//!
//! Everything here is pure: no I/O, no clock. Callers load rows and hand them in.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::entities::{event_flag, sales_data};
use crate::models::{AdChannel, AdChannelSelection, DateRange, Mall, MallSelection};

/// Anything that sits on the calendar axis.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for sales_data::Model {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for event_flag::Model {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Inclusive on both ends.
pub fn in_range(date: NaiveDate, range: &DateRange) -> bool {
    range.contains(date)
}

pub fn filter_by_range<'a, T: Dated>(items: &'a [T], range: &DateRange) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| in_range(item.date(), range))
        .collect()
}

/// One row of the dashboard chart.
///
/// Per-mall and per-channel fields are always present; deselected ones are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    pub amazon_sales: Decimal,
    pub rakuten_sales: Decimal,
    pub qoo10_sales: Decimal,

    pub amazon_ad_cost: Decimal,
    pub rakuten_ad_cost: Decimal,
    pub qoo10_ad_cost: Decimal,
    pub x_ad_cost: Decimal,
    pub tiktok_ad_cost: Decimal,

    pub total_sales: Decimal,
    pub total_ad_cost: Decimal,

    /// Names of event flags dated this day
    pub flags: Vec<String>,
}

impl ChartPoint {
    fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            amazon_sales: Decimal::ZERO,
            rakuten_sales: Decimal::ZERO,
            qoo10_sales: Decimal::ZERO,
            amazon_ad_cost: Decimal::ZERO,
            rakuten_ad_cost: Decimal::ZERO,
            qoo10_ad_cost: Decimal::ZERO,
            x_ad_cost: Decimal::ZERO,
            tiktok_ad_cost: Decimal::ZERO,
            total_sales: Decimal::ZERO,
            total_ad_cost: Decimal::ZERO,
            flags: Vec::new(),
        }
    }

    fn from_record(
        record: &sales_data::Model,
        malls: &MallSelection,
        channels: &AdChannelSelection,
    ) -> Self {
        let sales = |mall: Mall| {
            if malls.includes(mall) {
                record.sales(mall)
            } else {
                Decimal::ZERO
            }
        };
        let ad_cost = |channel: AdChannel| {
            if channels.includes(channel) {
                record.ad_cost(channel)
            } else {
                Decimal::ZERO
            }
        };

        let mut point = Self {
            date: record.date,
            amazon_sales: sales(Mall::Amazon),
            rakuten_sales: sales(Mall::Rakuten),
            qoo10_sales: sales(Mall::Qoo10),
            amazon_ad_cost: ad_cost(AdChannel::Amazon),
            rakuten_ad_cost: ad_cost(AdChannel::Rakuten),
            qoo10_ad_cost: ad_cost(AdChannel::Qoo10),
            x_ad_cost: ad_cost(AdChannel::X),
            tiktok_ad_cost: ad_cost(AdChannel::Tiktok),
            total_sales: Decimal::ZERO,
            total_ad_cost: Decimal::ZERO,
            flags: Vec::new(),
        };
        point.total_sales = point.amazon_sales + point.rakuten_sales + point.qoo10_sales;
        point.total_ad_cost = point.amazon_ad_cost
            + point.rakuten_ad_cost
            + point.qoo10_ad_cost
            + point.x_ad_cost
            + point.tiktok_ad_cost;
        point
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MallSalesTotals {
    pub amazon: Decimal,
    pub rakuten: Decimal,
    pub qoo10: Decimal,
}

/// KPI cards shown above the chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub total_sales: Decimal,
    pub total_ad_cost: Decimal,
    pub mall_sales: MallSalesTotals,
    /// Return on ad spend; absent when no ad cost was recorded
    pub roas: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub range: DateRange,
    pub series: Vec<ChartPoint>,
    pub totals: DashboardTotals,
}

/// `total_sales / total_ad_cost` to two decimal places.
pub fn roas(total_sales: Decimal, total_ad_cost: Decimal) -> Option<Decimal> {
    if total_ad_cost.is_zero() {
        None
    } else {
        total_sales
            .checked_div(total_ad_cost)
            .map(|ratio| ratio.round_dp(2))
    }
}

pub fn totals(series: &[ChartPoint]) -> DashboardTotals {
    let mut totals = DashboardTotals::default();
    for point in series {
        totals.mall_sales.amazon += point.amazon_sales;
        totals.mall_sales.rakuten += point.rakuten_sales;
        totals.mall_sales.qoo10 += point.qoo10_sales;
        totals.total_sales += point.total_sales;
        totals.total_ad_cost += point.total_ad_cost;
    }
    totals.roas = roas(totals.total_sales, totals.total_ad_cost);
    totals
}

/// Builds the dashboard series for `range`.
///
/// Records on the same date stay separate rows. A flag whose date has no record
/// gets a zero row of its own; flags outside the range are dropped.
pub fn build_dashboard(
    records: &[sales_data::Model],
    flags: &[event_flag::Model],
    range: DateRange,
    malls: &MallSelection,
    channels: &AdChannelSelection,
) -> DashboardSummary {
    let mut flags_by_date: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    for flag in filter_by_range(flags, &range) {
        flags_by_date
            .entry(flag.date)
            .or_default()
            .push(flag.name.clone());
    }

    let mut series: Vec<ChartPoint> = filter_by_range(records, &range)
        .into_iter()
        .map(|record| {
            let mut point = ChartPoint::from_record(record, malls, channels);
            if let Some(names) = flags_by_date.get(&record.date) {
                point.flags = names.clone();
            }
            point
        })
        .collect();

    let flag_only: Vec<ChartPoint> = flags_by_date
        .into_iter()
        .filter(|(date, _)| !series.iter().any(|point| point.date == *date))
        .map(|(date, names)| ChartPoint {
            flags: names,
            ..ChartPoint::zero(date)
        })
        .collect();
    series.extend(flag_only);

    // stable: duplicate dates keep their input order
    series.sort_by_key(|point| point.date);

    let totals = totals(&series);
    DashboardSummary {
        range,
        series,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(day(start), day(end)).unwrap()
    }

    fn record(date: &str) -> sales_data::Model {
        sales_data::Model {
            id: Uuid::new_v4(),
            date: day(date),
            amazon_sales: Decimal::ZERO,
            rakuten_sales: Decimal::ZERO,
            qoo10_sales: Decimal::ZERO,
            amazon_ad_cost: Decimal::ZERO,
            rakuten_ad_cost: Decimal::ZERO,
            qoo10_ad_cost: Decimal::ZERO,
            x_ad_cost: Decimal::ZERO,
            tiktok_ad_cost: Decimal::ZERO,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn flag(date: &str, name: &str) -> event_flag::Model {
        event_flag::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            date: day(date),
            description: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn flag_only_date_gets_zero_row() {
        let records = vec![sales_data::Model {
            amazon_sales: dec!(100),
            ..record("2024-01-01")
        }];
        let flags = vec![flag("2024-01-02", "Sale")];

        let summary = build_dashboard(
            &records,
            &flags,
            range("2024-01-01", "2024-01-02"),
            &MallSelection::all(),
            &AdChannelSelection::all(),
        );

        assert_eq!(summary.series.len(), 2);
        assert_eq!(summary.series[0].date, day("2024-01-01"));
        assert_eq!(summary.series[0].amazon_sales, dec!(100));
        assert!(summary.series[0].flags.is_empty());
        assert_eq!(summary.series[1].date, day("2024-01-02"));
        assert_eq!(summary.series[1].amazon_sales, Decimal::ZERO);
        assert_eq!(summary.series[1].flags, vec!["Sale".to_string()]);
    }

    #[test]
    fn flags_outside_range_are_excluded() {
        let flags = vec![flag("2023-12-31", "Too early"), flag("2024-02-01", "Too late")];
        let summary = build_dashboard(
            &[],
            &flags,
            range("2024-01-01", "2024-01-31"),
            &MallSelection::all(),
            &AdChannelSelection::all(),
        );
        assert!(summary.series.is_empty());
        assert_eq!(summary.totals, DashboardTotals::default());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let records = vec![
            record("2023-12-31"),
            record("2024-01-01"),
            record("2024-01-31"),
            record("2024-02-01"),
        ];
        let summary = build_dashboard(
            &records,
            &[],
            range("2024-01-01", "2024-01-31"),
            &MallSelection::all(),
            &AdChannelSelection::all(),
        );
        let dates: Vec<_> = summary.series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day("2024-01-01"), day("2024-01-31")]);
    }

    #[test]
    fn selection_zeroes_deselected_sources() {
        let records = vec![sales_data::Model {
            amazon_sales: dec!(100),
            rakuten_sales: dec!(200),
            qoo10_sales: dec!(300),
            amazon_ad_cost: dec!(10),
            x_ad_cost: dec!(5),
            tiktok_ad_cost: dec!(7),
            ..record("2024-01-10")
        }];

        let summary = build_dashboard(
            &records,
            &[],
            range("2024-01-01", "2024-01-31"),
            &MallSelection::only(&[Mall::Rakuten, Mall::Qoo10]),
            &AdChannelSelection::only(&[AdChannel::X]),
        );

        let point = &summary.series[0];
        assert_eq!(point.amazon_sales, Decimal::ZERO);
        assert_eq!(point.total_sales, dec!(500));
        assert_eq!(point.amazon_ad_cost, Decimal::ZERO);
        assert_eq!(point.total_ad_cost, dec!(5));
        assert_eq!(summary.totals.mall_sales.amazon, Decimal::ZERO);
        assert_eq!(summary.totals.roas, Some(dec!(100)));
    }

    #[test]
    fn duplicate_dates_stay_separate_and_sum_in_totals() {
        let records = vec![
            sales_data::Model {
                qoo10_sales: dec!(50),
                ..record("2024-01-05")
            },
            sales_data::Model {
                qoo10_sales: dec!(70),
                ..record("2024-01-03")
            },
            sales_data::Model {
                qoo10_sales: dec!(30),
                ..record("2024-01-05")
            },
        ];
        let flags = vec![flag("2024-01-05", "Campaign")];

        let summary = build_dashboard(
            &records,
            &flags,
            range("2024-01-01", "2024-01-31"),
            &MallSelection::all(),
            &AdChannelSelection::all(),
        );

        let rows: Vec<_> = summary
            .series
            .iter()
            .map(|p| (p.date, p.qoo10_sales, p.flags.len()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (day("2024-01-03"), dec!(70), 0),
                (day("2024-01-05"), dec!(50), 1),
                (day("2024-01-05"), dec!(30), 1),
            ]
        );
        assert_eq!(summary.totals.total_sales, dec!(150));
        assert_eq!(summary.totals.roas, None);
    }

    #[test]
    fn filter_by_range_works_for_records_and_flags() {
        let january = range("2024-01-01", "2024-01-31");
        let records = vec![record("2023-12-31"), record("2024-01-01"), record("2024-02-01")];
        let flags = vec![flag("2024-01-31", "Sale"), flag("2024-02-01", "Late")];

        let kept: Vec<_> = filter_by_range(&records, &january)
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(kept, vec![day("2024-01-01")]);

        let kept: Vec<_> = filter_by_range(&flags, &january)
            .into_iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(kept, vec!["Sale"]);
    }

    #[test]
    fn roas_rounds_to_cents() {
        assert_eq!(roas(dec!(100), dec!(3)), Some(dec!(33.33)));
        assert_eq!(roas(dec!(100), Decimal::ZERO), None);
    }
}
