// ⚙️ Run Configuration - Paths, school year, target districts, code mapping
//
// Every input and output path is explicit. Relative paths are resolved against
// a base directory chosen by the caller, never against a process-wide cwd change.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default name of the config file looked up by the binary
pub const DEFAULT_CONFIG_FILE: &str = "reconcile.toml";

// ============================================================================
// CONFIG SECTIONS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Internal district dataset (JSON array, short keys)
    pub internal_districts: PathBuf,

    /// Official enrollment export (CSV)
    pub enrollment_csv: PathBuf,

    /// Official revenue line items (CSV, UTF-8 with BOM)
    pub revenue_csv: PathBuf,

    pub validation_workbook: PathBuf,
    pub revenue_json: PathBuf,
    pub matched_revenue_json: PathBuf,
    pub districts_with_revenue_json: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            internal_districts: PathBuf::from("data/districts.json"),
            enrollment_csv: PathBuf::from("ospi_enrollment_2024-25.csv"),
            revenue_csv: PathBuf::from("data/ospi_revenues_2023-24.csv"),
            validation_workbook: PathBuf::from("data_validation.xlsx"),
            revenue_json: PathBuf::from("data/district_revenues_2023-24.json"),
            matched_revenue_json: PathBuf::from("data/district_revenues_matched_2023-24.json"),
            districts_with_revenue_json: PathBuf::from("data/districts_with_revenue.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Only internal records for this year take part in the comparison
    pub school_year: String,

    /// Canonical internal names looked up in the official dataset
    pub target_districts: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            school_year: "2024-25".to_string(),
            target_districts: [
                "Auburn School District",
                "Bellevue School District",
                "Federal Way Public Schools",
                "Kent School District",
                "Lake Washington School District",
                "Seattle Public Schools",
                "Spokane Public Schools",
                "Tacoma Public Schools",
                "Yakima School District",
                "Vancouver Public Schools",
                "Renton School District",
                "Northshore School District",
                "Issaquah School District",
                "Puyallup School District",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// The revenue export reports every amount twice
    pub revenue_divisor: f64,

    /// Internal district name -> County District Code
    pub district_codes: BTreeMap<String, String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        let district_codes = [
            ("Auburn School District", "17408"),
            ("Bellevue School District", "17405"),
            ("Federal Way Public Schools", "17210"),
            ("Kent School District", "17415"),
            ("Lake Washington School District", "17414"),
            ("Seattle Public Schools", "17001"),
            ("Spokane Public Schools", "32081"),
            ("Tacoma Public Schools", "27010"),
            ("Yakima School District", "39007"),
            ("Vancouver Public Schools", "06037"),
            ("Renton School District", "17403"),
            ("Northshore School District", "17417"),
            ("Issaquah School District", "17411"),
            ("Puyallup School District", "27003"),
            ("Highline School District", "17401"),
            ("Mercer Island School District", "17400"),
            ("Bethel School District", "27403"),
            ("Everett School District", "31002"),
            ("Edmonds School District", "31015"),
            ("Olympia School District", "34111"),
            ("Richland School District", "03400"),
            ("Kennewick School District", "03017"),
            ("Pasco School District", "11001"),
            ("Bellingham School District", "37501"),
            ("Mead School District", "32354"),
            ("Central Valley School District", "32356"),
        ]
        .iter()
        .map(|(name, code)| (name.to_string(), code.to_string()))
        .collect();

        EnrichmentConfig {
            revenue_divisor: 2.0,
            district_codes,
        }
    }
}

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub validation: ValidationConfig,
    pub enrichment: EnrichmentConfig,
}

/// Absolute (or base-relative) paths threaded through the pipelines
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPaths {
    pub internal_districts: PathBuf,
    pub enrollment_csv: PathBuf,
    pub revenue_csv: PathBuf,
    pub validation_workbook: PathBuf,
    pub revenue_json: PathBuf,
    pub matched_revenue_json: PathBuf,
    pub districts_with_revenue_json: PathBuf,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if !(self.enrichment.revenue_divisor.is_finite() && self.enrichment.revenue_divisor > 0.0) {
            anyhow::bail!(
                "enrichment.revenue_divisor must be a positive number, got {}",
                self.enrichment.revenue_divisor
            );
        }
        Ok(())
    }

    /// Resolve every configured path against `base`
    pub fn resolve_paths(&self, base: &Path) -> ResolvedPaths {
        let join = |p: &Path| -> PathBuf {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };

        ResolvedPaths {
            internal_districts: join(&self.paths.internal_districts),
            enrollment_csv: join(&self.paths.enrollment_csv),
            revenue_csv: join(&self.paths.revenue_csv),
            validation_workbook: join(&self.paths.validation_workbook),
            revenue_json: join(&self.paths.revenue_json),
            matched_revenue_json: join(&self.paths.matched_revenue_json),
            districts_with_revenue_json: join(&self.paths.districts_with_revenue_json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.validation.school_year, "2024-25");
        assert_eq!(config.validation.target_districts.len(), 14);
        assert_eq!(config.enrichment.revenue_divisor, 2.0);
        assert_eq!(
            config.enrichment.district_codes.get("Seattle Public Schools"),
            Some(&"17001".to_string())
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [validation]
            school_year = "2023-24"
            "#,
        )
        .unwrap();

        assert_eq!(config.validation.school_year, "2023-24");
        assert_eq!(config.validation.target_districts.len(), 14);
        assert_eq!(config.paths.revenue_csv, PathBuf::from("data/ospi_revenues_2023-24.csv"));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.enrichment.district_codes.len(), 26);
    }

    #[test]
    fn test_invalid_divisor_rejected() {
        let result = Config::from_toml_str(
            r#"
            [enrichment]
            revenue_divisor = 0.0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = Config::default();
        config.paths.revenue_json = PathBuf::from("/tmp/out.json");

        let resolved = config.resolve_paths(Path::new("/work"));
        assert_eq!(resolved.internal_districts, PathBuf::from("/work/data/districts.json"));
        assert_eq!(resolved.revenue_json, PathBuf::from("/tmp/out.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reconcile.toml");
        fs::write(
            &path,
            r#"
            [paths]
            revenue_csv = "rev.csv"

            [enrichment.district_codes]
            "Kent School District" = "17415"
            "#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.paths.revenue_csv, PathBuf::from("rev.csv"));
        assert_eq!(config.enrichment.district_codes.len(), 1);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::load_from_file(Path::new("/nonexistent/reconcile.toml"));
        assert!(result.is_err());
    }
}
