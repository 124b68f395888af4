//! Parsing of the free-text schedule column.
//!
//! A schedule holds one session per line, written as `Day | HH:MM - HH:MM`,
//! e.g. `Pazartesi | 14:40 - 16:30`. Slots in the calendar grid are keyed by
//! their start label only, so a session ending at `16:30` closes in the slot
//! labeled `16:40`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Minute past the hour at which every calendar slot starts.
pub const SLOT_MINUTE: u32 = 40;

/// Minute past the hour at which a session that fills its last slot ends.
pub const SESSION_END_MINUTE: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("schedule has no sessions")]
    Empty,

    #[error("session {0:?} has no `|` between day and hours")]
    MissingDay(String),

    #[error("session {0:?} has no `-` between start and end")]
    MissingRange(String),

    #[error("invalid clock time {0:?}")]
    InvalidTime(String),
}

/// Why a single session of an otherwise imported course was not linked.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionSkip {
    #[error("non-standard start time {start} on {day}")]
    NonStandardStart { day: String, start: ClockTime },

    #[error("non-standard end time {end} on {day}")]
    NonStandardEnd { day: String, end: ClockTime },

    #[error("session on {day} ends at {end}, not after its start {start}")]
    InvertedRange {
        day: String,
        start: ClockTime,
        end: ClockTime,
    },

    #[error("time slot not found: {day} {start}-{end}")]
    SlotNotFound {
        day: String,
        start: String,
        end: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ScheduleError::InvalidTime(s.to_string());

        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(hour) || hour.len() > 2 || !digits(minute) || minute.len() != 2 {
            return Err(invalid());
        }

        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }

        Ok(Self { hour, minute })
    }
}

/// Start and end slot labels of a session, as stored in `time_slots.hour_of_day`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpan {
    pub start: String,
    pub end: String,
}

/// One contiguous meeting of a course on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub day: String,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl Session {
    /// Whole hours covered by the session. Minutes are ignored, so
    /// `14:40 - 16:30` counts as 2. A session that does not end after it
    /// starts counts as 0.
    pub fn hours(&self) -> i64 {
        if self.is_inverted() {
            return 0;
        }
        i64::from(self.end.hour) - i64::from(self.start.hour)
    }

    fn is_inverted(&self) -> bool {
        self.end <= self.start
    }

    /// Maps the session onto calendar slot labels.
    ///
    /// The start must sit on a slot boundary (`:40`). An end at `:30` closes
    /// in the slot of the same hour, an end at `:40` is already a label.
    pub fn slot_span(&self) -> Result<SlotSpan, SessionSkip> {
        if self.is_inverted() {
            return Err(SessionSkip::InvertedRange {
                day: self.day.clone(),
                start: self.start,
                end: self.end,
            });
        }
        if self.start.minute != SLOT_MINUTE {
            return Err(SessionSkip::NonStandardStart {
                day: self.day.clone(),
                start: self.start,
            });
        }

        let end = match self.end.minute {
            SESSION_END_MINUTE | SLOT_MINUTE => ClockTime::new(self.end.hour, SLOT_MINUTE),
            _ => {
                return Err(SessionSkip::NonStandardEnd {
                    day: self.day.clone(),
                    end: self.end,
                });
            }
        };

        Ok(SlotSpan {
            start: self.start.to_string(),
            end: end.to_string(),
        })
    }
}

impl FromStr for Session {
    type Err = ScheduleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (day, range) = line
            .split_once('|')
            .ok_or_else(|| ScheduleError::MissingDay(line.to_string()))?;
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| ScheduleError::MissingRange(line.to_string()))?;

        let day = day.trim();
        if day.is_empty() {
            return Err(ScheduleError::MissingDay(line.to_string()));
        }

        Ok(Self {
            day: day.to_string(),
            start: start.parse()?,
            end: end.parse()?,
        })
    }
}

/// Parses every non-blank line of a schedule cell.
pub fn parse_schedule(text: &str) -> Result<Vec<Session>, ScheduleError> {
    let sessions = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Session>, _>>()?;

    if sessions.is_empty() {
        return Err(ScheduleError::Empty);
    }
    Ok(sessions)
}

/// Sum of whole hours over all sessions.
pub fn required_hours(sessions: &[Session]) -> i64 {
    sessions.iter().map(Session::hours).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(line: &str) -> Session {
        line.parse().unwrap()
    }

    #[test]
    fn parses_session_line() {
        let s = session("Pazartesi | 14:40 - 16:30");
        assert_eq!(s.day, "Pazartesi");
        assert_eq!(s.start, ClockTime::new(14, 40));
        assert_eq!(s.end, ClockTime::new(16, 30));
    }

    #[test]
    fn tolerates_tight_separators() {
        let s = session("Cuma|13:40-15:30\r");
        assert_eq!(s.day, "Cuma");
        assert_eq!(s.start, ClockTime::new(13, 40));
        assert_eq!(s.end, ClockTime::new(15, 30));
    }

    #[test]
    fn hour_may_be_unpadded() {
        assert_eq!("9:40".parse::<ClockTime>().unwrap(), ClockTime::new(9, 40));
        assert_eq!("09:40".parse::<ClockTime>().unwrap(), ClockTime::new(9, 40));
        assert_eq!(ClockTime::new(9, 40).to_string(), "9:40");
    }

    #[test]
    fn rejects_bad_clock_times() {
        for bad in ["", "1440", "ab:40", "14:4", "14:400", "+9:40", "24:40", "14:60"] {
            assert!(bad.parse::<ClockTime>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn rejects_lines_without_separators() {
        assert_eq!(
            "Pazartesi 14:40 - 16:30".parse::<Session>(),
            Err(ScheduleError::MissingDay("Pazartesi 14:40 - 16:30".to_string()))
        );
        assert_eq!(
            "Pazartesi | 14:40".parse::<Session>(),
            Err(ScheduleError::MissingRange("Pazartesi | 14:40".to_string()))
        );
    }

    #[test]
    fn required_hours_ignore_minutes() {
        let sessions = parse_schedule("Salı | 09:40 - 11:30\nSalı | 13:40 - 14:40").unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(required_hours(&sessions), 3);
        assert_eq!(session("Salı | 14:40 - 16:30").hours(), 2);
    }

    #[test]
    fn blank_lines_are_ignored_but_empty_schedule_fails() {
        let sessions = parse_schedule("\nCuma | 08:40 - 10:30\n\n").unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(parse_schedule("  \n "), Err(ScheduleError::Empty));
    }

    #[test]
    fn end_label_is_next_slot_boundary() {
        for hour in 9..=21 {
            for end_minute in [30, 40] {
                let s = Session {
                    day: "Perşembe".to_string(),
                    start: ClockTime::new(8, 40),
                    end: ClockTime::new(hour, end_minute),
                };
                let span = s.slot_span().unwrap();
                assert_eq!(span.start, "8:40");
                assert_eq!(span.end, format!("{hour}:40"));
            }
        }
    }

    #[test]
    fn non_standard_minutes_are_skipped() {
        let start = session("Çarşamba | 14:30 - 16:30");
        assert!(matches!(
            start.slot_span(),
            Err(SessionSkip::NonStandardStart { .. })
        ));

        let end = session("Çarşamba | 14:40 - 16:15");
        assert!(matches!(
            end.slot_span(),
            Err(SessionSkip::NonStandardEnd { .. })
        ));
    }

    #[test]
    fn inverted_session_is_skipped_and_counts_no_hours() {
        let s = session("Cuma | 14:40 - 12:30");
        assert_eq!(s.hours(), 0);
        assert_eq!(
            s.slot_span(),
            Err(SessionSkip::InvertedRange {
                day: "Cuma".to_string(),
                start: ClockTime::new(14, 40),
                end: ClockTime::new(12, 30),
            })
        );

        let same = session("Cuma | 14:40 - 14:40");
        assert_eq!(same.hours(), 0);
        assert!(matches!(
            same.slot_span(),
            Err(SessionSkip::InvertedRange { .. })
        ));

        let sessions = parse_schedule("Cuma | 14:40 - 12:30\nCuma | 08:40 - 10:30").unwrap();
        assert_eq!(required_hours(&sessions), 2);
    }
}
