use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::CurveType;

pub const ONSET_YEAR_COLUMN: &str = "Epid Tahun (Tkh Onset)";
pub const ONSET_WEEK_COLUMN: &str = "Epid Minggu (Tkh Onset)";
pub const NOTIFICATION_YEAR_COLUMN: &str = "Epid Tahun (Tkh Notifikasi)";
pub const NOTIFICATION_WEEK_COLUMN: &str = "Epid Minggu (Tkh Notifikasi)";
pub const ONSET_DATE_COLUMN: &str = "Tarikh Onset";

pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y",
];

/// Which date the weekly columns are counted against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    #[default]
    Onset,
    Notification,
}

/// Ordering for weekly buckets. `Week` ignores the year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WeeklySort {
    #[default]
    Week,
    YearWeek,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Columns the normalizer reads, fixed for one run.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConfig {
    Weekly {
        year_column: String,
        week_column: String,
        sort: WeeklySort,
    },
    Daily {
        date_column: String,
        date_formats: Vec<String>,
    },
}

impl ColumnConfig {
    pub fn curve(&self) -> CurveType {
        match self {
            ColumnConfig::Weekly { .. } => CurveType::Weekly,
            ColumnConfig::Daily { .. } => CurveType::Daily,
        }
    }

    pub fn required_columns(&self) -> Vec<&str> {
        match self {
            ColumnConfig::Weekly {
                year_column,
                week_column,
                ..
            } => vec![year_column.as_str(), week_column.as_str()],
            ColumnConfig::Daily { date_column, .. } => vec![date_column.as_str()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsSection {
    pub basis: Option<Basis>,
    pub year: Option<String>,
    pub week: Option<String>,
    pub date: Option<String>,
    pub date_formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeeklySection {
    pub sort: Option<WeeklySort>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartSection {
    pub title: Option<String>,
    pub show_summary: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Contents of an optional `epicurve.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub columns: ColumnsSection,
    pub weekly: WeeklySection,
    pub chart: ChartSection,
    pub logging: LoggingConfig,
}

impl FileConfig {
    /// Reads and parses an `epicurve.toml`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub basis: Option<Basis>,
    pub year_column: Option<String>,
    pub week_column: Option<String>,
    pub date_column: Option<String>,
    pub sort: Option<WeeklySort>,
    pub title: Option<String>,
    pub hide_summary: bool,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub input: Option<PathBuf>,
    pub basis: Basis,
    pub columns: ColumnConfig,
    pub title: Option<String>,
    pub show_summary: bool,
    pub logging: LoggingConfig,
}

impl Settings {
    pub fn resolve(
        curve: CurveType,
        input: Option<PathBuf>,
        file: FileConfig,
        overrides: Overrides,
    ) -> Self {
        let FileConfig {
            columns: section,
            weekly,
            chart,
            mut logging,
        } = file;
        let basis = overrides.basis.or(section.basis).unwrap_or_default();

        let columns = match curve {
            CurveType::Weekly => {
                let (default_year, default_week) = match basis {
                    Basis::Onset => (ONSET_YEAR_COLUMN, ONSET_WEEK_COLUMN),
                    Basis::Notification => (NOTIFICATION_YEAR_COLUMN, NOTIFICATION_WEEK_COLUMN),
                };
                ColumnConfig::Weekly {
                    year_column: overrides
                        .year_column
                        .or(section.year)
                        .unwrap_or_else(|| default_year.to_string()),
                    week_column: overrides
                        .week_column
                        .or(section.week)
                        .unwrap_or_else(|| default_week.to_string()),
                    sort: overrides.sort.or(weekly.sort).unwrap_or_default(),
                }
            }
            CurveType::Daily => ColumnConfig::Daily {
                date_column: overrides
                    .date_column
                    .or(section.date)
                    .unwrap_or_else(|| ONSET_DATE_COLUMN.to_string()),
                date_formats: section.date_formats.unwrap_or_else(|| {
                    DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
                }),
            },
        };

        if let Some(level) = overrides.log_level {
            logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            logging.format = format;
        }

        Self {
            input,
            basis,
            columns,
            title: overrides.title.or(chart.title),
            show_summary: !overrides.hide_summary && chart.show_summary.unwrap_or(true),
            logging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn weekly_defaults_use_onset_columns() {
        let settings = Settings::resolve(
            CurveType::Weekly,
            None,
            FileConfig::default(),
            Overrides::default(),
        );
        assert_eq!(
            settings.columns,
            ColumnConfig::Weekly {
                year_column: ONSET_YEAR_COLUMN.to_string(),
                week_column: ONSET_WEEK_COLUMN.to_string(),
                sort: WeeklySort::Week,
            }
        );
        assert!(settings.show_summary);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn notification_basis_switches_weekly_columns() {
        let overrides = Overrides {
            basis: Some(Basis::Notification),
            ..Overrides::default()
        };
        let settings =
            Settings::resolve(CurveType::Weekly, None, FileConfig::default(), overrides);
        assert_eq!(
            settings.columns.required_columns(),
            vec![NOTIFICATION_YEAR_COLUMN, NOTIFICATION_WEEK_COLUMN]
        );
    }

    #[test]
    fn daily_defaults_use_onset_date() {
        let settings = Settings::resolve(
            CurveType::Daily,
            None,
            FileConfig::default(),
            Overrides::default(),
        );
        match settings.columns {
            ColumnConfig::Daily {
                date_column,
                date_formats,
            } => {
                assert_eq!(date_column, ONSET_DATE_COLUMN);
                assert_eq!(date_formats.len(), DEFAULT_DATE_FORMATS.len());
            }
            other => panic!("unexpected columns {other:?}"),
        }
    }

    #[test]
    fn cli_overrides_win_over_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [columns]
            week = "Minggu"
            year = "Tahun"

            [weekly]
            sort = "year-week"

            [chart]
            title = "From file"
            show_summary = true

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();
        let overrides = Overrides {
            week_column: Some("Week".to_string()),
            title: Some("From flag".to_string()),
            hide_summary: true,
            log_level: Some("warn".to_string()),
            ..Overrides::default()
        };
        let settings = Settings::resolve(CurveType::Weekly, None, file, overrides);

        assert_eq!(
            settings.columns,
            ColumnConfig::Weekly {
                year_column: "Tahun".to_string(),
                week_column: "Week".to_string(),
                sort: WeeklySort::YearWeek,
            }
        );
        assert_eq!(settings.title.as_deref(), Some("From flag"));
        assert!(!settings.show_summary);
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("[columns]\nyaer = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn loads_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[columns]\ndate = \"Onset\"\ndate_formats = [\"%d/%m/%Y\"]").unwrap();

        let config = FileConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.columns.date.as_deref(), Some("Onset"));
        assert_eq!(
            config.columns.date_formats,
            Some(vec!["%d/%m/%Y".to_string()])
        );
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = FileConfig::from_file("/nonexistent/epicurve.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/epicurve.toml"));
    }
}
