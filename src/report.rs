use std::fmt;

use crate::analysis::SummaryStatistics;
use crate::config::SimulationParameters;
use crate::trajectory::YearStep;

/// Integer with comma thousands separators: `1234567` → `1,234,567`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Plain-text summary of a run.
pub struct Report<'a> {
    pub params: &'a SimulationParameters,
    pub summary: &'a SummaryStatistics,
}

impl<'a> Report<'a> {
    pub fn new(params: &'a SimulationParameters, summary: &'a SummaryStatistics) -> Self {
        Report { params, summary }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (params, summary) = (self.params, self.summary);
        writeln!(
            f,
            "Investment type: {} ({})",
            params.investment_type,
            params.investment_type.description()
        )?;
        writeln!(f, "Starting value: ${}", group_thousands(params.start_value))?;
        writeln!(f, "Annual withdrawal: ${}", group_thousands(params.annual_withdrawal))?;
        writeln!(
            f,
            "Years in retirement (minimum-most likely-maximum): {}-{}-{}",
            params.min_years, params.mode_years, params.max_years
        )?;
        writeln!(f, "Number of trials: {}", group_thousands(summary.trial_count as i64))?;
        writeln!(f, "Odds of running out of money: {:.1}%", summary.bankruptcy_probability_percent)?;
        writeln!(f, "Average outcome: ${}", group_thousands(summary.mean_outcome))?;
        writeln!(f, "Minimum outcome: ${}", group_thousands(summary.min_outcome))?;
        writeln!(f, "Maximum outcome: ${}", group_thousands(summary.max_outcome))?;
        writeln!(
            f,
            "Outcome percentiles (p5 / p50 / p95): ${} / ${} / ${}",
            group_thousands(summary.p5_outcome),
            group_thousands(summary.p50_outcome),
            group_thousands(summary.p95_outcome),
        )
    }
}

/// One line per simulated year of a single trial.
pub struct TraceTable<'a>(pub &'a [YearStep]);

impl fmt::Display for TraceTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>4} | {:>14} | {:>16}", "Year", "Withdrawal", "Value")?;
        writeln!(f, "{}", "-".repeat(40))?;
        for (year, step) in self.0.iter().enumerate() {
            writeln!(
                f,
                "{:>4} | {:>14} | {:>16}",
                year + 1,
                group_thousands(step.withdrawal),
                group_thousands(step.value)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::InvestmentType;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(2_000_000), "2,000,000");
        assert_eq!(group_thousands(-16_704), "-16,704");
        assert_eq!(group_thousands(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn report_lists_every_statistic() {
        let params = SimulationParameters {
            investment_type: InvestmentType::Stocks,
            ..SimulationParameters::canonical()
        };
        let summary = SummaryStatistics {
            trial_count: 50_000,
            bankrupt_count: 6_150,
            bankruptcy_probability_percent: 12.3,
            mean_outcome: 3_456_789,
            min_outcome: 0,
            max_outcome: 41_000_000,
            p5_outcome: 0,
            p50_outcome: 2_100_000,
            p95_outcome: 11_000_000,
        };
        let text = Report::new(&params, &summary).to_string();
        assert!(text.contains("Investment type: stocks (SP500)"));
        assert!(text.contains("Starting value: $2,000,000"));
        assert!(text.contains("Annual withdrawal: $80,000"));
        assert!(text.contains("18-25-40"));
        assert!(text.contains("Number of trials: 50,000"));
        assert!(text.contains("Odds of running out of money: 12.3%"));
        assert!(text.contains("Average outcome: $3,456,789"));
        assert!(text.contains("Maximum outcome: $41,000,000"));
    }

    #[test]
    fn trace_has_one_row_per_year() {
        let steps = [
            YearStep { withdrawal: 40_000, value: 1_008_000 },
            YearStep { withdrawal: 41_200, value: 1_015_140 },
        ];
        let text = TraceTable(&steps).to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("1,015,140"));
    }
}
