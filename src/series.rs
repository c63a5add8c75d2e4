use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::round_decimal;
use crate::error::{Result, SimulationError};

/// Ordered annual rates in decimal form (0.08 = 8 %).
///
/// Lookups wrap around the end of the series, so a finite historical record
/// can back a retirement window of any length.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSeries {
    rates: Vec<f64>,
}

pub type ReturnSeries = RateSeries;
pub type InflationSeries = RateSeries;

impl RateSeries {
    pub fn new(rates: Vec<f64>) -> Self {
        RateSeries { rates }
    }

    /// A series holding the same rate every year.
    pub fn constant(rate: f64, len: usize) -> Self {
        RateSeries { rates: vec![rate; len] }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.rates
    }

    /// Rate for `index`, taken modulo the series length. Panics on an empty series.
    pub fn rate_at(&self, index: usize) -> f64 {
        self.rates[index % self.rates.len()]
    }

    /// Fails with a data error naming `label` when the series is empty.
    pub fn ensure_non_empty(&self, label: &str) -> Result<()> {
        if self.rates.is_empty() {
            return Err(SimulationError::Data(format!("{label} series is empty")));
        }
        Ok(())
    }
}

/// Parse one percentage per line into decimal rates rounded to 5 places.
/// Blank lines are skipped.
pub fn parse_percent_series(reader: impl BufRead) -> Result<RateSeries> {
    let mut rates = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            SimulationError::Data(format!("error reading line {}: {e}", line_no + 1))
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let pct: f64 = trimmed.parse().map_err(|_| {
            SimulationError::Data(format!(
                "line {}: expected a percentage, found {trimmed:?}",
                line_no + 1
            ))
        })?;
        let rate = round_decimal(pct / 100.0, 5).map_err(|e| {
            SimulationError::Data(format!("line {}: cannot round {trimmed:?}: {e}", line_no + 1))
        })?;
        rates.push(rate);
    }
    Ok(RateSeries::new(rates))
}

/// Historical asset mixes a retirement can be invested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentType {
    /// 10-year Treasury bond.
    #[default]
    Bonds,
    /// S&P 500.
    Stocks,
    /// 40 % S&P 500 / 50 % Treasury bond / 10 % cash.
    SbcBlend,
    /// 50 % S&P 500 / 50 % Treasury bond.
    SbBlend,
}

impl InvestmentType {
    pub const ALL: [InvestmentType; 4] = [
        InvestmentType::Bonds,
        InvestmentType::Stocks,
        InvestmentType::SbcBlend,
        InvestmentType::SbBlend,
    ];

    pub fn key(self) -> &'static str {
        match self {
            InvestmentType::Bonds => "bonds",
            InvestmentType::Stocks => "stocks",
            InvestmentType::SbcBlend => "sbc_blend",
            InvestmentType::SbBlend => "sb_blend",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InvestmentType::Bonds => "10-yr Treasury Bond",
            InvestmentType::Stocks => "SP500",
            InvestmentType::SbcBlend => "40% SP500/50% Treasury Bond/10% cash",
            InvestmentType::SbBlend => "50% SP500/50% Treasury Bond",
        }
    }

    /// Historical returns file for this mix, in percent.
    pub fn file_name(self) -> &'static str {
        match self {
            InvestmentType::Bonds => "10-yr_tBond_returns_1926-2013_pct.txt",
            InvestmentType::Stocks => "SP500_returns_1926-2013_pct.txt",
            InvestmentType::SbcBlend => "S-B-C_blend_1926-2013_pct.txt",
            InvestmentType::SbBlend => "S-B_blend_1926-2013_pct.txt",
        }
    }
}

impl fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for InvestmentType {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        InvestmentType::ALL
            .into_iter()
            .find(|t| t.key() == wanted)
            .ok_or_else(|| {
                SimulationError::Configuration(format!(
                    "unknown investment type {s:?} (expected bonds, stocks, sbc_blend or sb_blend)"
                ))
            })
    }
}

pub const INFLATION_FILE: &str = "annual_infl_rate_1926-2013_pct.txt";

/// Historical return series for every investment type plus the shared
/// inflation series. Loaded once, then only borrowed.
#[derive(Debug, Clone)]
pub struct SeriesRepository {
    bonds: ReturnSeries,
    stocks: ReturnSeries,
    sbc_blend: ReturnSeries,
    sb_blend: ReturnSeries,
    inflation: InflationSeries,
}

impl SeriesRepository {
    pub fn new(
        bonds: ReturnSeries,
        stocks: ReturnSeries,
        sbc_blend: ReturnSeries,
        sb_blend: ReturnSeries,
        inflation: InflationSeries,
    ) -> Self {
        SeriesRepository { bonds, stocks, sbc_blend, sb_blend, inflation }
    }

    /// Read all five percent files from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<RateSeries> {
            let path = dir.join(name);
            let series = read_percent_file(&path)?;
            debug!(file = %path.display(), years = series.len(), "loaded rate series");
            Ok(series)
        };
        Ok(SeriesRepository {
            bonds: read(InvestmentType::Bonds.file_name())?,
            stocks: read(InvestmentType::Stocks.file_name())?,
            sbc_blend: read(InvestmentType::SbcBlend.file_name())?,
            sb_blend: read(InvestmentType::SbBlend.file_name())?,
            inflation: read(INFLATION_FILE)?,
        })
    }

    pub fn returns(&self, investment: InvestmentType) -> &ReturnSeries {
        match investment {
            InvestmentType::Bonds => &self.bonds,
            InvestmentType::Stocks => &self.stocks,
            InvestmentType::SbcBlend => &self.sbc_blend,
            InvestmentType::SbBlend => &self.sb_blend,
        }
    }

    pub fn inflation(&self) -> &InflationSeries {
        &self.inflation
    }
}

pub fn read_percent_file(path: &Path) -> Result<RateSeries> {
    let file = File::open(path).map_err(|source| SimulationError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    parse_percent_series(BufReader::new(file)).map_err(|e| match e {
        SimulationError::Data(msg) => SimulationError::Data(format!("{}: {msg}", path.display())),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn percent_lines_become_rounded_decimals() {
        let input = "8.5\n-43.84\n\n  12.345678 \n";
        let series = parse_percent_series(Cursor::new(input)).unwrap();
        assert_eq!(series.as_slice(), &[0.085, -0.4384, 0.12346]);
    }

    #[test]
    fn rounding_uses_the_stored_decimal() {
        // 0.0245 / 100 and 0.1155 / 100 are stored just below the half.
        let series = parse_percent_series(Cursor::new("0.0245\n-0.1155\n")).unwrap();
        assert_eq!(series.as_slice(), &[0.00024, -0.00115]);
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let err = parse_percent_series(Cursor::new("1.0\nabc\n")).unwrap_err();
        match err {
            SimulationError::Data(msg) => assert!(msg.contains("line 2"), "{msg}"),
            other => panic!("expected data error, got {other:?}"),
        }
    }

    #[test]
    fn rate_at_wraps_around() {
        let series = RateSeries::new(vec![0.1, 0.2, 0.3]);
        assert_eq!(series.rate_at(0), 0.1);
        assert_eq!(series.rate_at(3), 0.1);
        assert_eq!(series.rate_at(7), 0.2);
    }

    #[test]
    fn empty_series_is_a_data_error() {
        let err = RateSeries::new(vec![]).ensure_non_empty("inflation").unwrap_err();
        assert!(matches!(err, SimulationError::Data(ref m) if m.contains("inflation")));
    }

    #[test]
    fn investment_type_parses_case_insensitively() {
        assert_eq!("SBC_Blend".parse::<InvestmentType>().unwrap(), InvestmentType::SbcBlend);
        assert_eq!(" stocks ".parse::<InvestmentType>().unwrap(), InvestmentType::Stocks);
        assert!(matches!(
            "gold".parse::<InvestmentType>(),
            Err(SimulationError::Configuration(_))
        ));
    }

    #[test]
    fn repository_selects_series_by_type() {
        let repo = SeriesRepository::new(
            RateSeries::constant(0.01, 1),
            RateSeries::constant(0.02, 1),
            RateSeries::constant(0.03, 1),
            RateSeries::constant(0.04, 1),
            RateSeries::constant(0.05, 1),
        );
        assert_eq!(repo.returns(InvestmentType::Stocks).rate_at(0), 0.02);
        assert_eq!(repo.returns(InvestmentType::SbBlend).rate_at(0), 0.04);
        assert_eq!(repo.inflation().rate_at(0), 0.05);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let err = SeriesRepository::load(Path::new("/nonexistent/nestegg-data")).unwrap_err();
        match err {
            SimulationError::Io { path, .. } => {
                assert!(path.ends_with(InvestmentType::Bonds.file_name()))
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
