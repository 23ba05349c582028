use crate::models::{MergedMonthlyPoint, MonthlyDataPoint};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Outer-joins the current and previous periods on the month key.
///
/// Months appear in first-seen order: every current-period month, then the
/// months only the previous period has. A period without an entry for a month
/// yields `None` for both of its fields.
pub fn merge_periods(
    current: &[MonthlyDataPoint],
    previous: &[MonthlyDataPoint],
) -> Vec<MergedMonthlyPoint> {
    let mut months: Vec<&str> = Vec::with_capacity(current.len() + previous.len());
    for point in current.iter().chain(previous) {
        if !months.contains(&point.month.as_str()) {
            months.push(&point.month);
        }
    }

    months
        .into_iter()
        .map(|month| {
            let cur = current.iter().find(|p| p.month == month);
            let prev = previous.iter().find(|p| p.month == month);
            MergedMonthlyPoint {
                month: month.to_string(),
                current_registrations: cur.map(|p| p.registrations),
                current_unemployed: cur.map(|p| p.unemployed),
                previous_registrations: prev.map(|p| p.registrations),
                previous_unemployed: prev.map(|p| p.unemployed),
            }
        })
        .collect()
}

pub fn month_label(month: &str) -> String {
    match month.trim().parse::<usize>() {
        Ok(n @ 1..=12) => MONTH_NAMES[n - 1].to_string(),
        _ => month.to_string(),
    }
}

/// Display ordering only: numeric months ascending, anything else after them
/// in its original order.
pub fn calendar_order(points: &mut [MergedMonthlyPoint]) {
    points.sort_by_key(|point| point.month.trim().parse::<u32>().unwrap_or(u32::MAX));
}

pub fn period_totals(points: &[MonthlyDataPoint]) -> (u64, u64) {
    points.iter().fold((0u64, 0u64), |(reg, unemp), p| {
        (
            reg.saturating_add(p.registrations),
            unemp.saturating_add(p.unemployed),
        )
    })
}
