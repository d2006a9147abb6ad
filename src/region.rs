use std::{fmt, str::FromStr};

use regex::{Match, Regex};

use crate::errors::SelectError;

/// Half-open interval [start, end) on a contig, zero-based.
///
/// Coordinates are signed: windows dilated around candidates near the
/// origin can start below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    ctg: Box<str>,
    start: i64,
    end: i64,
}

impl Region {
    /// Bounds are taken as given; aggregation rejects start > end.
    pub fn new(ctg: &str, start: i64, end: i64) -> Self {
        Self {
            ctg: Box::from(ctg),
            start,
            end,
        }
    }

    pub fn ctg(&self) -> &str {
        &self.ctg
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn len(&self) -> i64 {
        (self.end - self.start).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, pos: i64) -> bool {
        pos >= self.start && pos < self.end
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}-{}", self.ctg, self.start, self.end)
    }
}

impl FromStr for Region {
    type Err = SelectError;

    /// Parses `ctg:start-stop` with 1-based inclusive coordinates (commas
    /// allowed) into a zero-based half-open region.
    fn from_str(reg_str: &str) -> Result<Self, SelectError> {
        let err = |s: &str| Err(SelectError::BadRegion(s.to_owned()));

        let parse_x = |s: Match| parse_i64_with_commas(s.as_str());

        let reg = Regex::new(r#"^([^:\s]+):([0-9,]+)-([0-9,]+)$"#).unwrap();
        if let Some(cap) = reg.captures(reg_str) {
            match (cap.get(1), cap.get(2).and_then(parse_x), cap.get(3).and_then(parse_x)) {
                (Some(c), Some(p), Some(q)) => {
                    let start = p.max(1) - 1;
                    let region = Region::new(c.as_str(), start, q);
                    debug!("Parsed region: {}", region);
                    if start > q {
                        Err(SelectError::InvalidRegion(region))
                    } else {
                        Ok(region)
                    }
                }
                _ => err(reg_str),
            }
        } else {
            err(reg_str)
        }
    }
}

fn parse_i64_with_commas(s: &str) -> Option<i64> {
    s.replace(',', "").parse::<i64>().ok()
}
