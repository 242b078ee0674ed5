use crate::domain::model::Markers;
use crate::utils::error::Result;
use crate::utils::validation::validate_pattern;
use regex::Regex;

/// `Période : 01.2026`, also tolerates `Periode`, `Period` and a missing colon
pub const DEFAULT_PERIOD_PATTERN: &str = r"(?i)p[ée]riode?\s*:?\s*(\d{2})\.(\d{4})";

/// AVS number, e.g. `756.1234.5678.97`
pub const DEFAULT_EMPLOYEE_ID_PATTERN: &str = r"\b\d{3}\.\d{4}\.\d{4}\.\d{2}\b";

#[derive(Debug, Clone)]
pub struct MarkerExtractor {
    period: Regex,
    employee_id: Regex,
}

impl MarkerExtractor {
    /// The period pattern needs two capture groups: month, then year.
    pub fn new(period_pattern: &str, employee_id_pattern: &str) -> Result<Self> {
        Ok(Self {
            period: validate_pattern("markers.period_pattern", period_pattern, 2)?,
            employee_id: validate_pattern("markers.employee_id_pattern", employee_id_pattern, 0)?,
        })
    }

    /// 兩個標記都必須出現；只命中其中一個視為無標記
    pub fn extract(&self, text: &str) -> Option<Markers> {
        let (year, month) = self.find_period(text)?;
        let employee_id = self.employee_id.find(text)?.as_str().to_string();

        Some(Markers {
            year,
            month,
            employee_id,
        })
    }

    fn find_period(&self, text: &str) -> Option<(i32, u32)> {
        // 第一個月份合法的命中才算數
        self.period.captures_iter(text).find_map(|caps| {
            let month: u32 = caps.get(1)?.as_str().parse().ok()?;
            let year: i32 = caps.get(2)?.as_str().parse().ok()?;
            (1..=12).contains(&month).then_some((year, month))
        })
    }
}

impl Default for MarkerExtractor {
    fn default() -> Self {
        Self {
            period: Regex::new(DEFAULT_PERIOD_PATTERN).expect("default period pattern is valid"),
            employee_id: Regex::new(DEFAULT_EMPLOYEE_ID_PATTERN)
                .expect("default employee id pattern is valid"),
        }
    }
}
