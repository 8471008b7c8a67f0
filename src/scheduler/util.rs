use super::SchedError;
use crate::model::{DepartmentId, Registry, Shift, ShiftId};
use chrono::{Datelike, Months, NaiveDate};

/// Mois calendaire, `month` indexé à partir de 0 comme dans le format persisté.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    year: i32,
    month: u32,
    first: NaiveDate,
    days: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, SchedError> {
        if month > 11 {
            return Err(SchedError::InvalidMonth(month));
        }
        let first = NaiveDate::from_ymd_opt(year, month + 1, 1)
            .ok_or(SchedError::InvalidMonth(month))?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or(SchedError::InvalidMonth(month))?;
        let days = next.signed_duration_since(first).num_days() as u32;
        Ok(Self {
            year,
            month,
            first,
            days,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn month(&self) -> u32 {
        self.month
    }
    pub fn days_in_month(&self) -> u32 {
        self.days
    }

    /// Mois précédent ; janvier bascule sur décembre de l'année d'avant.
    pub fn previous(&self) -> Option<Self> {
        if self.month == 0 {
            Self::new(self.year - 1, 11).ok()
        } else {
            Self::new(self.year, self.month - 1).ok()
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take(self.days as usize)
    }
}

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn weekday_name(day: u8) -> Option<&'static str> {
    WEEKDAY_NAMES.get(usize::from(day)).copied()
}

/// Jour de la semaine, 0 = dimanche.
pub(crate) fn weekday_from_sunday(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Cycle de rotation d'un service : shifts triés par `order`, puis id.
pub(crate) fn rotation_sequence(registry: &Registry, department: DepartmentId) -> Vec<&Shift> {
    let mut shifts: Vec<&Shift> = registry
        .shifts
        .iter()
        .filter(|s| s.department_id == department)
        .collect();
    shifts.sort_by_key(|s| (s.order, s.id));
    shifts
}

pub(super) fn position_of(shifts: &[&Shift], id: ShiftId) -> Option<usize> {
    shifts.iter().position(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths_follow_calendar() {
        assert_eq!(YearMonth::new(2026, 1).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2024, 1).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2026, 0).unwrap().days_in_month(), 31);
        assert_eq!(YearMonth::new(2026, 3).unwrap().days_in_month(), 30);
        assert_eq!(YearMonth::new(2026, 11).unwrap().days_in_month(), 31);
    }

    #[test]
    fn january_wraps_to_previous_december() {
        let prev = YearMonth::new(2026, 0).unwrap().previous().unwrap();
        assert_eq!((prev.year(), prev.month()), (2025, 11));
    }

    #[test]
    fn rejects_month_out_of_range() {
        assert!(matches!(
            YearMonth::new(2026, 12),
            Err(SchedError::InvalidMonth(12))
        ));
    }

    #[test]
    fn sunday_is_zero() {
        let sunday = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(weekday_from_sunday(sunday), 0);
        assert_eq!(weekday_from_sunday(sunday.succ_opt().unwrap()), 1);
    }
}
