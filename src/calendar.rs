//! Month grid generation for the calendar view.
//!
//! The grid is a list of cells in Monday-first week order: blank padding
//! before day 1, one cell per day, and blank padding after the last day so
//! the grid always holds whole weeks. Each day cell carries the to-do
//! summary and the flags the view needs to highlight it.

use chrono::{Datelike, Months, NaiveDate};

use crate::dates::{DateKey, MonthKey};
use crate::holidays::HolidaySet;
use crate::models::TodoBook;

pub const DAYS_PER_WEEK: usize = 7;

/// Default number of to-do markers drawn in a single day cell
pub const DEFAULT_MARKER_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySlot {
    pub date: DateKey,
    /// Number of to-dos on this day (not capped)
    pub count: usize,
    /// Highest star rating among this day's to-dos, 0 when there are none
    pub max_stars: u8,
    pub is_sunday: bool,
    pub is_holiday: bool,
}

impl DaySlot {
    pub fn day(&self) -> u32 {
        self.date.date().day()
    }

    /// Markers to draw; the true count is still available in `count`
    pub fn markers(&self, limit: usize) -> usize {
        self.count.min(limit)
    }

    /// Sundays and holidays share the same highlight
    pub fn needs_attention(&self) -> bool {
        self.is_sunday || self.is_holiday
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Empty,
    Day(DaySlot),
}

impl Slot {
    pub fn as_day(&self) -> Option<&DaySlot> {
        match self {
            Slot::Day(day) => Some(day),
            Slot::Empty => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: MonthKey,
    pub slots: Vec<Slot>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[Slot]> {
        self.slots.chunks(DAYS_PER_WEEK)
    }

    pub fn week_count(&self) -> usize {
        self.slots.len() / DAYS_PER_WEEK
    }

    pub fn leading_blanks(&self) -> usize {
        self.slots
            .iter()
            .take_while(|slot| matches!(slot, Slot::Empty))
            .count()
    }

    pub fn day_count(&self) -> usize {
        self.days().count()
    }

    pub fn days(&self) -> impl Iterator<Item = &DaySlot> {
        self.slots.iter().filter_map(Slot::as_day)
    }
}

/// Monday-based weekday index: Monday = 0 .. Sunday = 6
pub fn monday_offset(date: NaiveDate) -> usize {
    let sunday_based = date.weekday().num_days_from_sunday() as usize;
    (sunday_based + 6) % DAYS_PER_WEEK
}

/// Number of days in the month containing `date`, taken from the actual last day
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        // chrono's upper bound is far past any calendar this app shows
        .unwrap_or(31)
}

/// Build the grid for the month containing `reference`. The day component of
/// `reference` is ignored.
pub fn build_month_grid(reference: NaiveDate, todos: &TodoBook, holidays: &HolidaySet) -> MonthGrid {
    let first = reference.with_day(1).unwrap_or(reference);
    let offset = monday_offset(first);
    let day_count = days_in_month(first);

    let mut slots = Vec::with_capacity(6 * DAYS_PER_WEEK);
    slots.extend(std::iter::repeat_n(Slot::Empty, offset));

    for date in first.iter_days().take(day_count as usize) {
        let key = DateKey::new(date);
        let items = todos.items_on(key);
        slots.push(Slot::Day(DaySlot {
            date: key,
            count: items.len(),
            max_stars: items.iter().map(|item| item.stars).max().unwrap_or(0),
            is_sunday: date.weekday().num_days_from_sunday() == 0,
            is_holiday: holidays.contains(date),
        }));
    }

    while slots.len() % DAYS_PER_WEEK != 0 {
        slots.push(Slot::Empty);
    }

    MonthGrid {
        month: MonthKey::from_date(first),
        slots,
    }
}
