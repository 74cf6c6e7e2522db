/*!
 * Subtitle timestamps and their three textual encodings.
 *
 * Millisecond precision is canonical. ASS only carries centiseconds, so
 * writing to ASS truncates and reading from ASS right-pads the fraction.
 */

use std::fmt;

/// A point in time inside a subtitle track
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub milliseconds: u32,
}

impl Timestamp {
    pub fn new(hours: u32, minutes: u32, seconds: u32, milliseconds: u32) -> Self {
        Self::from_millis(
            hours as u64 * 3_600_000 + minutes as u64 * 60_000 + seconds as u64 * 1_000 + milliseconds as u64,
        )
    }

    pub fn from_millis(ms: u64) -> Self {
        Self {
            hours: (ms / 3_600_000) as u32,
            minutes: ((ms % 3_600_000) / 60_000) as u32,
            seconds: ((ms % 60_000) / 1_000) as u32,
            milliseconds: (ms % 1_000) as u32,
        }
    }

    pub fn as_millis(&self) -> u64 {
        self.hours as u64 * 3_600_000
            + self.minutes as u64 * 60_000
            + self.seconds as u64 * 1_000
            + self.milliseconds as u64
    }

    /// Parse `HH:MM:SS,mmm`. A `.` separator is tolerated.
    pub fn parse_srt(value: &str) -> Option<Self> {
        parse_clock(value, &[',', '.'], false)
    }

    /// Parse `HH:MM:SS.mmm` or the short `MM:SS.mmm` form.
    pub fn parse_vtt(value: &str) -> Option<Self> {
        parse_clock(value, &['.'], true)
    }

    /// Parse `H:MM:SS.cc`.
    ///
    /// The fraction is right-padded with zeros to three digits and cut to
    /// three, so `.5` and `.50` are both 500 ms and `.123` stays 123 ms.
    pub fn parse_ass(value: &str) -> Option<Self> {
        parse_clock(value, &['.'], false)
    }

    pub fn to_srt(&self) -> String {
        format!(
            "{:02}:{:02}:{:02},{:03}",
            self.hours, self.minutes, self.seconds, self.milliseconds
        )
    }

    pub fn to_vtt(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            self.hours, self.minutes, self.seconds, self.milliseconds
        )
    }

    /// Centiseconds are truncated, never rounded.
    pub fn to_ass(&self) -> String {
        format!(
            "{}:{:02}:{:02}.{:02}",
            self.hours,
            self.minutes,
            self.seconds,
            self.milliseconds / 10
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_srt())
    }
}

fn parse_clock(value: &str, fraction_separators: &[char], allow_short: bool) -> Option<Timestamp> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    let (hours, minutes, rest) = match parts.as_slice() {
        [h, m, rest] => (parse_digits(h)?, parse_digits(m)?, *rest),
        [m, rest] if allow_short => (0, parse_digits(m)?, *rest),
        _ => return None,
    };

    let (seconds, fraction) = rest.split_once(|c| fraction_separators.contains(&c))?;
    let seconds = parse_digits(seconds)?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    Some(Timestamp {
        hours,
        minutes,
        seconds,
        milliseconds: parse_fraction(fraction)?,
    })
}

fn parse_digits(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn parse_fraction(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded: String = value.chars().chain("000".chars()).take(3).collect();
    padded.parse().ok()
}
