//! Interval math behind availability slots and booking conflict checks.
//!
//! Availability is declared per weekday as a list of `"HH:MM-HH:MM"` strings.
//! A booking request must fit inside one declared slot, and must not overlap
//! any live booking already on the mentor's calendar.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Datelike, NaiveTime, Utc};

/// Half-open daily time window, start strictly before end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Slot {
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Parses one `"HH:MM-HH:MM"` slot string.
pub fn parse_slot(raw: &str) -> Result<Slot> {
    let (start_raw, end_raw) = raw
        .split_once('-')
        .ok_or_else(|| anyhow!("malformed slot {:?}: expected \"HH:MM-HH:MM\"", raw))?;
    let start = NaiveTime::parse_from_str(start_raw, "%H:%M")
        .map_err(|_| anyhow!("malformed slot {:?}: bad start time {:?}", raw, start_raw))?;
    let end = NaiveTime::parse_from_str(end_raw, "%H:%M")
        .map_err(|_| anyhow!("malformed slot {:?}: bad end time {:?}", raw, end_raw))?;
    if start >= end {
        bail!("malformed slot {:?}: start must be before end", raw);
    }
    Ok(Slot { start, end })
}

/// Parses a whole weekday's slot list, rejecting slots that overlap each other.
pub fn parse_day_slots(raw_slots: &[String]) -> Result<Vec<Slot>> {
    let mut slots = raw_slots
        .iter()
        .map(|s| parse_slot(s))
        .collect::<Result<Vec<_>>>()?;
    slots.sort_by_key(|s| s.start);
    for pair in slots.windows(2) {
        if pair[1].start < pair[0].end {
            bail!(
                "slots {}-{} and {}-{} overlap",
                pair[0].start.format("%H:%M"),
                pair[0].end.format("%H:%M"),
                pair[1].start.format("%H:%M"),
                pair[1].end.format("%H:%M"),
            );
        }
    }
    Ok(slots)
}

/// The overlapping-interval predicate used for booking conflicts: two
/// half-open intervals collide iff each starts before the other ends.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// True when `[start, end]` fits entirely inside one declared slot.
pub fn slots_cover(slots: &[Slot], start: NaiveTime, end: NaiveTime) -> bool {
    slots.iter().any(|slot| slot.contains(start, end))
}

/// Weekday index used by the availability table: 0 = Monday … 6 = Sunday.
pub fn weekday_index(at: DateTime<Utc>) -> i16 {
    at.weekday().num_days_from_monday() as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_well_formed_slots() {
        let slot = parse_slot("09:00-10:30").unwrap();
        assert_eq!(slot.start, t(9, 0));
        assert_eq!(slot.end, t(10, 30));
    }

    #[test]
    fn rejects_malformed_slots() {
        assert!(parse_slot("9am-10am").is_err());
        assert!(parse_slot("09:00").is_err());
        assert!(parse_slot("09:00-09:00").is_err());
        assert!(parse_slot("10:00-09:00").is_err());
        assert!(parse_slot("25:00-26:00").is_err());
    }

    #[test]
    fn rejects_overlapping_day_slots() {
        let ok = vec!["09:00-10:00".to_string(), "10:00-11:00".to_string()];
        assert_eq!(parse_day_slots(&ok).unwrap().len(), 2);

        let bad = vec!["09:00-10:30".to_string(), "10:00-11:00".to_string()];
        assert!(parse_day_slots(&bad).is_err());

        // Order in the input must not matter.
        let unordered = vec!["13:00-14:00".to_string(), "09:00-13:30".to_string()];
        assert!(parse_day_slots(&unordered).is_err());
    }

    #[test]
    fn overlap_predicate_is_half_open() {
        let at = |h| Utc.with_ymd_and_hms(2026, 3, 2, h, 0, 0).unwrap();
        assert!(intervals_overlap(at(9), at(11), at(10), at(12)));
        assert!(intervals_overlap(at(10), at(12), at(9), at(11)));
        assert!(intervals_overlap(at(9), at(12), at(10), at(11)));
        // Back-to-back bookings do not conflict.
        assert!(!intervals_overlap(at(9), at(10), at(10), at(11)));
        assert!(!intervals_overlap(at(10), at(11), at(9), at(10)));
    }

    #[test]
    fn coverage_requires_full_containment() {
        let slots = parse_day_slots(&["09:00-12:00".to_string(), "14:00-17:00".to_string()]).unwrap();
        assert!(slots_cover(&slots, t(9, 0), t(10, 0)));
        assert!(slots_cover(&slots, t(14, 0), t(17, 0)));
        assert!(!slots_cover(&slots, t(11, 30), t(12, 30)));
        assert!(!slots_cover(&slots, t(12, 0), t(14, 0)));
        assert!(!slots_cover(&slots, t(8, 0), t(9, 30)));
    }

    #[test]
    fn weekday_index_is_monday_based() {
        // 2026-03-02 is a Monday.
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        assert_eq!(weekday_index(monday), 0);
        let sunday = Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap();
        assert_eq!(weekday_index(sunday), 6);
    }
}
