//! CSV export of solution arrays
//!
//! Writes a [`VectorArray`] as a table with one row per degree of freedom
//! and one column per vector, readable by spreadsheet tools, pandas or
//! MATLAB.
//!
//! # Output
//!
//! ```csv
//! # Solutions of heat equation
//! # Generated: 2026-02-11T15:30:00+00:00
//! # Title: diffusion = 0.1
//! # Vectors: 2
//! # Dimension: 3
//! #
//! dof,u[0],u[1]
//! 0,1.000000,0.500000
//! 1,2.000000,1.000000
//! 2,3.000000,1.500000
//! ```
//!
//! The metadata block is only written with `include_metadata`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::discretizations::{Discretization, VisualizeOptions, Visualizer};
use crate::error::{MorError, MorResult};
use crate::vectorarrays::VectorArray;

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Example
///
/// ```rust
/// use mor_rs::output::CsvConfig;
///
/// let config = CsvConfig::european().precision(10).path("solution.csv");
/// assert_eq!(config.delimiter, ';');
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places (default: 6)
    pub precision: usize,

    /// Write `#` comment lines before the table (default: false)
    pub include_metadata: bool,

    /// Additional `key: value` lines of the metadata block
    pub custom: Vec<(String, String)>,

    /// Header of the first column (default: "dof")
    pub index_header: String,

    /// Output file used when the call does not name one
    pub path: Option<PathBuf>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            custom: Vec::new(),
            index_header: "dof".to_string(),
            path: None,
        }
    }
}

impl CsvConfig {
    /// Semicolon delimiter, comma as decimal separator
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// 12 decimal places
    pub fn high_precision() -> Self {
        Self {
            precision: 12,
            ..Default::default()
        }
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }

    /// Add a line to the metadata block
    pub fn add_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.include_metadata = true;
        self.custom.push((key.into(), value.into()));
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn validate(&self) -> MorResult<()> {
        if self.delimiter == self.decimal_separator {
            return Err(MorError::Configuration(format!(
                "CSV delimiter and decimal separator are both '{}'",
                self.delimiter
            )));
        }
        if self.delimiter == '\n' || self.delimiter == '"' {
            return Err(MorError::Configuration(format!(
                "invalid CSV delimiter {:?}",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Format number with configured precision and decimal separator
    fn format_number(&self, value: f64) -> String {
        let formatted = format!("{:.prec$}", value, prec = self.precision);
        if self.decimal_separator != '.' {
            formatted.replace('.', &self.decimal_separator.to_string())
        } else {
            formatted
        }
    }
}

// =============================================================================
// Visualizer
// =============================================================================

/// Writes solutions to CSV files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvVisualizer {
    config: CsvConfig,
}

impl CsvVisualizer {
    pub fn new(config: CsvConfig) -> MorResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// Write the table for `u` to `writer`
    ///
    /// # Errors
    ///
    /// - `InvariantViolation` if `u` is empty, contains NaN/Inf or does not
    ///   live in the solution space of `discretization`
    /// - `Io` if writing fails
    pub fn write<W: Write>(
        &self,
        writer: &mut W,
        u: &VectorArray,
        discretization: &dyn Discretization,
        options: &VisualizeOptions,
    ) -> MorResult<()> {
        // ============================= Validation =============================

        if u.space() != discretization.solution_space() {
            return Err(MorError::space_mismatch(
                "CSV export",
                discretization.solution_space(),
                u.space(),
            ));
        }
        if u.is_empty() {
            return Err(MorError::InvariantViolation(
                "empty data: nothing to export".to_string(),
            ));
        }
        if !u.is_finite() {
            return Err(MorError::InvariantViolation(
                "invalid data: NaN or Inf detected".to_string(),
            ));
        }

        // ============================= Header =============================

        if self.config.include_metadata {
            self.write_metadata(writer, u, discretization, options)?;
        }

        let delimiter = self.config.delimiter.to_string();
        let mut header = vec![self.config.index_header.clone()];
        header.extend((0..u.len()).map(|i| options.label(i)));
        writeln!(writer, "{}", header.join(&delimiter))?;

        // ============================= Rows =============================

        let data = u.data();
        for row in 0..u.dim() {
            let mut fields = vec![row.to_string()];
            fields.extend(
                data.row(row)
                    .iter()
                    .map(|value| self.config.format_number(*value)),
            );
            writeln!(writer, "{}", fields.join(&delimiter))?;
        }
        Ok(())
    }

    fn write_metadata<W: Write>(
        &self,
        writer: &mut W,
        u: &VectorArray,
        discretization: &dyn Discretization,
        options: &VisualizeOptions,
    ) -> MorResult<()> {
        writeln!(writer, "# Solutions of {}", discretization.name())?;
        writeln!(writer, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;
        if let Some(title) = &options.title {
            writeln!(writer, "# Title: {}", title)?;
        }
        writeln!(writer, "# Vectors: {}", u.len())?;
        writeln!(writer, "# Dimension: {}", u.dim())?;
        for (key, value) in &self.config.custom {
            writeln!(writer, "# {}: {}", key, value)?;
        }
        writeln!(writer, "#")?;
        Ok(())
    }
}

impl Visualizer for CsvVisualizer {
    fn visualize(
        &self,
        u: &VectorArray,
        discretization: &dyn Discretization,
        options: &VisualizeOptions,
    ) -> MorResult<()> {
        let path = options
            .path
            .as_ref()
            .or(self.config.path.as_ref())
            .ok_or_else(|| MorError::Configuration("CSV export needs an output path".to_string()))?;

        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer, u, discretization, options)?;
        writer.flush()?;
        log::debug!("wrote {} vectors to {}", u.len(), path.display());
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
