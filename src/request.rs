use crate::error::{PredictError, Result};

/// One user submission, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    pub weather: String,
    pub team1: String,
    pub team2: String,
    pub location: String,
    pub attendance: u64,
}

impl MatchRequest {
    /// Pure assembly. Negative attendance is clamped to zero; categorical
    /// membership is checked later by the encoder.
    pub fn build(
        weather: impl Into<String>,
        team1: impl Into<String>,
        team2: impl Into<String>,
        location: impl Into<String>,
        attendance: i64,
    ) -> Self {
        Self {
            weather: weather.into(),
            team1: team1.into(),
            team2: team2.into(),
            location: location.into(),
            attendance: attendance.max(0) as u64,
        }
    }

    pub fn same_team(&self) -> bool {
        self.team1 == self.team2
    }
}

/// Parses attendance typed by a user. Blank input means zero, a leading `-`
/// clamps to zero, thousands separators are accepted.
pub fn parse_attendance(raw: &str) -> Result<u64> {
    let cleaned = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect::<String>();
    if cleaned.is_empty() {
        return Ok(0);
    }
    if let Some(rest) = cleaned.strip_prefix('-') {
        return match rest.parse::<u64>() {
            Ok(_) => Ok(0),
            Err(_) => Err(PredictError::InvalidAttendance(raw.to_string())),
        };
    }
    cleaned
        .parse::<u64>()
        .map_err(|_| PredictError::InvalidAttendance(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_clamps_negative_attendance() {
        let req = MatchRequest::build("Sunny", "India", "Australia", "Delhi", -5);
        assert_eq!(req.attendance, 0);
        let req = MatchRequest::build("Sunny", "India", "Australia", "Delhi", 50_000);
        assert_eq!(req.attendance, 50_000);
        assert!(!req.same_team());
    }

    #[test]
    fn parse_attendance_accepts_common_forms() {
        assert_eq!(parse_attendance("50000").unwrap(), 50_000);
        assert_eq!(parse_attendance(" 50,000 ").unwrap(), 50_000);
        assert_eq!(parse_attendance("").unwrap(), 0);
        assert_eq!(parse_attendance("-12").unwrap(), 0);
        assert!(parse_attendance("lots").is_err());
        assert!(parse_attendance("12.5").is_err());
    }
}
