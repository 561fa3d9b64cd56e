use serde::{Deserialize, Serialize};
use std::fmt;

/// A status family whose variants form an ordered ladder, best first.
///
/// The ladder pairs with a list of ascending upper bounds: the label at
/// index `i` applies below bound `i`, and the last label applies to
/// everything at or above the last bound.
pub trait StatusLevel: Copy + PartialEq + fmt::Debug + 'static {
    /// Variants in ascending order of the classified value
    const LADDER: &'static [Self];
}

/// Severity of a sensor value, budget utilization or alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Normal operating range
    Normal,
    /// Approaching a limit
    Warning,
    /// Limit exceeded
    Critical,
}

impl StatusLevel for Severity {
    const LADDER: &'static [Self] = &[Severity::Normal, Severity::Warning, Severity::Critical];
}

/// Connectivity of a device, derived from the age of its last reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Warning,
    Offline,
}

impl StatusLevel for Connectivity {
    const LADDER: &'static [Self] = &[Connectivity::Online, Connectivity::Warning, Connectivity::Offline];
}

/// Emission intensity of a facility zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl StatusLevel for Intensity {
    const LADDER: &'static [Self] = &[Intensity::Low, Intensity::Medium, Intensity::High];
}

/// Letter grade of a sustainability score. Ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreGrade {
    D,
    C,
    B,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl StatusLevel for ScoreGrade {
    const LADDER: &'static [Self] = &[
        ScoreGrade::D,
        ScoreGrade::C,
        ScoreGrade::B,
        ScoreGrade::A,
        ScoreGrade::APlus,
    ];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Online => write!(f, "online"),
            Connectivity::Warning => write!(f, "warning"),
            Connectivity::Offline => write!(f, "offline"),
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intensity::Low => write!(f, "low"),
            Intensity::Medium => write!(f, "medium"),
            Intensity::High => write!(f, "high"),
        }
    }
}

impl fmt::Display for ScoreGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreGrade::D => write!(f, "D"),
            ScoreGrade::C => write!(f, "C"),
            ScoreGrade::B => write!(f, "B"),
            ScoreGrade::A => write!(f, "A"),
            ScoreGrade::APlus => write!(f, "A+"),
        }
    }
}

/// Status attached to a classified reading, whatever family produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "label", rename_all = "lowercase")]
pub enum Status {
    Severity(Severity),
    Intensity(Intensity),
    Grade(ScoreGrade),
}

impl Status {
    /// Severity view of the status, for alerting.
    ///
    /// Intensity maps one to one. Grades of C and D count as warning and
    /// critical respectively.
    pub fn severity(&self) -> Severity {
        match self {
            Status::Severity(s) => *s,
            Status::Intensity(Intensity::Low) => Severity::Normal,
            Status::Intensity(Intensity::Medium) => Severity::Warning,
            Status::Intensity(Intensity::High) => Severity::Critical,
            Status::Grade(ScoreGrade::D) => Severity::Critical,
            Status::Grade(ScoreGrade::C) => Severity::Warning,
            Status::Grade(_) => Severity::Normal,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Severity(s) => s.fmt(f),
            Status::Intensity(i) => i.fmt(f),
            Status::Grade(g) => g.fmt(f),
        }
    }
}

impl From<Severity> for Status {
    fn from(value: Severity) -> Self {
        Status::Severity(value)
    }
}

impl From<Intensity> for Status {
    fn from(value: Intensity) -> Self {
        Status::Intensity(value)
    }
}

impl From<ScoreGrade> for Status {
    fn from(value: ScoreGrade) -> Self {
        Status::Grade(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Normal < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn test_status_severity_view() {
        assert_eq!(Status::from(Intensity::High).severity(), Severity::Critical);
        assert_eq!(Status::from(ScoreGrade::B).severity(), Severity::Normal);
        assert_eq!(Status::from(ScoreGrade::C).severity(), Severity::Warning);
        assert_eq!(Status::from(Severity::Warning).severity(), Severity::Warning);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&Status::Grade(ScoreGrade::APlus)).unwrap();
        assert_eq!(json, r#"{"family":"grade","label":"A+"}"#);
        assert_eq!(ScoreGrade::APlus.to_string(), "A+");
    }
}
