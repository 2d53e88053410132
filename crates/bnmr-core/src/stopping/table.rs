//! Calibration table of stopping-profile shape parameters versus
//! implantation energy.
//!
//! One row per calibration energy, loaded once at analyzer construction.
//! Three monotone cubic interpolants (α, β, z_max against energy) are built
//! lazily on first access and cached for the table's lifetime; the cache is
//! scoped to the owning instance, never process-wide.

use crate::domain::{DataError, DomainError};
use crate::numerics::pchip::MonotoneCubic;
use crate::stopping::profile::StoppingProfile;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

const COLUMN_ENERGY: &str = "Energy (keV)";
const COLUMN_ALPHA: &str = "Alpha";
const COLUMN_ALPHA_ERROR: &str = "Alpha Error";
const COLUMN_BETA: &str = "Beta";
const COLUMN_BETA_ERROR: &str = "Beta Error";
const COLUMN_Z_MAX: &str = "Max (nm)";
const COLUMN_Z_MAX_ERROR: &str = "Max Error (nm)";

/// One calibration energy with fitted stopping-profile shape parameters and
/// their uncertainties. Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRow {
    pub energy_kev: f64,
    pub alpha: f64,
    pub alpha_error: f64,
    pub beta: f64,
    pub beta_error: f64,
    pub z_max_nm: f64,
    pub z_max_error_nm: f64,
}

#[derive(Debug, Clone)]
struct TableInterpolants {
    alpha: MonotoneCubic,
    beta: MonotoneCubic,
    z_max: MonotoneCubic,
}

#[derive(Debug, Clone)]
pub struct StoppingProfileTable {
    rows: Vec<CalibrationRow>,
    interpolants: OnceLock<TableInterpolants>,
}

impl StoppingProfileTable {
    /// Sorts the rows by energy and validates them; the table is unusable on
    /// any failure.
    pub fn from_rows(mut rows: Vec<CalibrationRow>) -> Result<Self, DataError> {
        rows.sort_by(|a, b| a.energy_kev.total_cmp(&b.energy_kev));
        validate_rows(&rows)?;
        Ok(Self {
            rows,
            interpolants: OnceLock::new(),
        })
    }

    /// Parses the calibration format: one comma-separated header row with
    /// named columns, one data row per energy.
    pub fn from_csv_str(source: &str) -> Result<Self, DataError> {
        let mut lines = source
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());
        let (_, header) = lines.next().ok_or(DataError::MissingColumn {
            column: COLUMN_ENERGY,
        })?;
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let column = |name: &'static str| -> Result<usize, DataError> {
            names
                .iter()
                .position(|candidate| *candidate == name)
                .ok_or(DataError::MissingColumn { column: name })
        };
        let energy_column = column(COLUMN_ENERGY)?;
        let alpha_column = column(COLUMN_ALPHA)?;
        let alpha_error_column = column(COLUMN_ALPHA_ERROR)?;
        let beta_column = column(COLUMN_BETA)?;
        let beta_error_column = column(COLUMN_BETA_ERROR)?;
        let z_max_column = column(COLUMN_Z_MAX)?;
        let z_max_error_column = column(COLUMN_Z_MAX_ERROR)?;

        let mut rows = Vec::new();
        for (line_index, line) in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != names.len() {
                return Err(DataError::FieldCountMismatch {
                    line: line_index + 1,
                    expected: names.len(),
                    actual: fields.len(),
                });
            }
            let parse = |index: usize, name: &str| -> Result<f64, DataError> {
                fields[index]
                    .parse::<f64>()
                    .map_err(|_| DataError::UnparsableField {
                        line: line_index + 1,
                        column: name.to_string(),
                        value: fields[index].to_string(),
                    })
            };
            rows.push(CalibrationRow {
                energy_kev: parse(energy_column, COLUMN_ENERGY)?,
                alpha: parse(alpha_column, COLUMN_ALPHA)?,
                alpha_error: parse(alpha_error_column, COLUMN_ALPHA_ERROR)?,
                beta: parse(beta_column, COLUMN_BETA)?,
                beta_error: parse(beta_error_column, COLUMN_BETA_ERROR)?,
                z_max_nm: parse(z_max_column, COLUMN_Z_MAX)?,
                z_max_error_nm: parse(z_max_error_column, COLUMN_Z_MAX_ERROR)?,
            });
        }
        Self::from_rows(rows)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        let source = std::fs::read_to_string(path).map_err(|error| DataError::Io {
            detail: error.to_string(),
        })?;
        Self::from_csv_str(&source)
    }

    pub fn rows(&self) -> &[CalibrationRow] {
        &self.rows
    }

    /// Lower usable interpolation bound: the smallest calibrated energy
    /// inset by `sqrt(machine ε)` against edge instabilities.
    pub fn energy_min_kev(&self) -> f64 {
        self.rows[0].energy_kev + f64::EPSILON.sqrt()
    }

    /// Upper usable interpolation bound, inset like [`Self::energy_min_kev`].
    pub fn energy_max_kev(&self) -> f64 {
        self.rows[self.rows.len() - 1].energy_kev - f64::EPSILON.sqrt()
    }

    /// Interpolated α. Outside the calibrated range the boundary cubic is
    /// extrapolated silently; use [`Self::params`] for a range-checked lookup.
    pub fn alpha(&self, energy_kev: f64) -> f64 {
        self.interpolants().alpha.evaluate(energy_kev)
    }

    /// Interpolated β; same extrapolation caveat as [`Self::alpha`].
    pub fn beta(&self, energy_kev: f64) -> f64 {
        self.interpolants().beta.evaluate(energy_kev)
    }

    /// Interpolated z_max; same extrapolation caveat as [`Self::alpha`].
    pub fn z_max_nm(&self, energy_kev: f64) -> f64 {
        self.interpolants().z_max.evaluate(energy_kev)
    }

    /// Range-checked lookup of all three shape parameters at once. This is
    /// the path the analyzer uses; queries outside the usable bounds fail
    /// fast instead of extrapolating.
    pub fn params(&self, energy_kev: f64) -> Result<StoppingProfile, DomainError> {
        let min = self.energy_min_kev();
        let max = self.energy_max_kev();
        if !(energy_kev >= min && energy_kev <= max) {
            return Err(DomainError::EnergyOutOfRange {
                energy: energy_kev,
                min,
                max,
            });
        }
        Ok(StoppingProfile {
            alpha: self.alpha(energy_kev),
            beta: self.beta(energy_kev),
            z_max_nm: self.z_max_nm(energy_kev),
        })
    }

    fn interpolants(&self) -> &TableInterpolants {
        self.interpolants.get_or_init(|| {
            tracing::debug!(rows = self.rows.len(), "building stopping-profile interpolants");
            let energies: Vec<f64> = self.rows.iter().map(|row| row.energy_kev).collect();
            let build = |values: Vec<f64>| {
                // Rows were validated in from_rows; the interpolant input
                // invariants (length, ordering, finiteness) hold.
                MonotoneCubic::new(energies.clone(), values)
                    .expect("calibration rows validated at load")
            };
            TableInterpolants {
                alpha: build(self.rows.iter().map(|row| row.alpha).collect()),
                beta: build(self.rows.iter().map(|row| row.beta).collect()),
                z_max: build(self.rows.iter().map(|row| row.z_max_nm).collect()),
            }
        })
    }
}

fn validate_rows(rows: &[CalibrationRow]) -> Result<(), DataError> {
    if rows.len() < 2 {
        return Err(DataError::InsufficientRows { actual: rows.len() });
    }
    for (index, row) in rows.iter().enumerate() {
        if !row.energy_kev.is_finite() {
            return Err(DataError::NonFiniteField {
                field: "energy_kev",
                index,
                value: row.energy_kev,
            });
        }
        if index > 0 && row.energy_kev <= rows[index - 1].energy_kev {
            return Err(DataError::NonIncreasingEnergy {
                index,
                previous: rows[index - 1].energy_kev,
                current: row.energy_kev,
            });
        }
        for (field, value) in [
            ("alpha", row.alpha),
            ("beta", row.beta),
            ("z_max_nm", row.z_max_nm),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DataError::NonPositiveShape {
                    field,
                    index,
                    value,
                });
            }
        }
        for (field, value) in [
            ("alpha_error", row.alpha_error),
            ("beta_error", row.beta_error),
            ("z_max_error_nm", row.z_max_error_nm),
        ] {
            if !value.is_finite() {
                return Err(DataError::NonFiniteField {
                    field,
                    index,
                    value,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CalibrationRow, StoppingProfileTable};
    use crate::domain::{DataError, DomainError};

    fn row(energy: f64, alpha: f64, beta: f64, z_max: f64) -> CalibrationRow {
        CalibrationRow {
            energy_kev: energy,
            alpha,
            alpha_error: 0.1,
            beta,
            beta_error: 0.1,
            z_max_nm: z_max,
            z_max_error_nm: 2.0,
        }
    }

    #[test]
    fn two_row_table_interpolates_between_calibration_points() {
        let table =
            StoppingProfileTable::from_rows(vec![row(10.0, 3.0, 5.0, 100.0), row(20.0, 3.2, 4.8, 140.0)])
                .expect("valid table");

        assert!(table.energy_min_kev() > 10.0);
        assert!(table.energy_max_kev() < 20.0);

        let z_max = table.z_max_nm(15.0);
        assert!(z_max > 100.0 && z_max < 140.0);

        let params = table.params(15.0).expect("interior query");
        assert!(params.alpha > 3.0 && params.alpha < 3.2);
        assert!(params.beta > 4.8 && params.beta < 5.0);
    }

    #[test]
    fn rows_are_sorted_before_validation() {
        let table =
            StoppingProfileTable::from_rows(vec![row(20.0, 3.2, 4.8, 140.0), row(10.0, 3.0, 5.0, 100.0)])
                .expect("unsorted input is sorted on load");
        assert_eq!(table.rows()[0].energy_kev, 10.0);
    }

    #[test]
    fn queries_outside_usable_bounds_fail_fast() {
        let table =
            StoppingProfileTable::from_rows(vec![row(10.0, 3.0, 5.0, 100.0), row(20.0, 3.2, 4.8, 140.0)])
                .expect("valid table");
        assert!(matches!(
            table.params(9.0),
            Err(DomainError::EnergyOutOfRange { .. })
        ));
        assert!(matches!(
            table.params(20.0),
            Err(DomainError::EnergyOutOfRange { .. })
        ));
    }

    #[test]
    fn construction_rejects_bad_tables() {
        assert_eq!(
            StoppingProfileTable::from_rows(vec![row(10.0, 3.0, 5.0, 100.0)]).expect_err("one row"),
            DataError::InsufficientRows { actual: 1 }
        );
        assert!(matches!(
            StoppingProfileTable::from_rows(vec![
                row(10.0, 3.0, 5.0, 100.0),
                row(10.0, 3.2, 4.8, 140.0)
            ])
            .expect_err("duplicate energy"),
            DataError::NonIncreasingEnergy { .. }
        ));
        assert!(matches!(
            StoppingProfileTable::from_rows(vec![
                row(10.0, 3.0, 5.0, 100.0),
                row(20.0, -3.2, 4.8, 140.0)
            ])
            .expect_err("negative alpha"),
            DataError::NonPositiveShape { field: "alpha", .. }
        ));
    }

    #[test]
    fn csv_loader_reads_named_columns_in_any_order() {
        let source = "Alpha, Energy (keV), Beta, Alpha Error, Beta Error, Max (nm), Max Error (nm)\n\
                      3.0, 10.0, 5.0, 0.1, 0.1, 100.0, 2.0\n\
                      3.2, 20.0, 4.8, 0.1, 0.1, 140.0, 2.0\n";
        let table = StoppingProfileTable::from_csv_str(source).expect("valid csv");
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[1].z_max_nm, 140.0);
    }

    #[test]
    fn csv_loader_reports_missing_columns_and_bad_fields() {
        let missing = "Energy (keV), Alpha, Beta\n10.0, 3.0, 5.0\n";
        assert!(matches!(
            StoppingProfileTable::from_csv_str(missing).expect_err("missing columns"),
            DataError::MissingColumn { .. }
        ));

        let garbled = "Energy (keV), Alpha, Alpha Error, Beta, Beta Error, Max (nm), Max Error (nm)\n\
                       10.0, three, 0.1, 5.0, 0.1, 100.0, 2.0\n\
                       20.0, 3.2, 0.1, 4.8, 0.1, 140.0, 2.0\n";
        assert!(matches!(
            StoppingProfileTable::from_csv_str(garbled).expect_err("unparsable field"),
            DataError::UnparsableField { .. }
        ));
    }
}
