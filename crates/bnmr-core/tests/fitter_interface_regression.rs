use bnmr_core::relaxation::RelaxationParameters;
use bnmr_core::stopping::CalibrationRow;
use bnmr_core::{DepthResolvedAnalyzer, StoppingProfileTable, SuperconductingState};
use serde::Deserialize;

/// Configuration fixture in the shape a fit driver would hand over.
#[derive(Debug, Deserialize)]
struct FitConfiguration {
    state: SuperconductingState,
    relax: RelaxationParameters,
}

const FIT_CONFIGURATION_JSON: &str = r#"{
    "state": {
        "temperature_k": 4.0,
        "critical_temperature_k": 9.25,
        "gap_mev": 1.406,
        "coherence_length_nm": 40.0,
        "mean_free_path_nm": 20.0,
        "penetration_depth_nm": 50.0,
        "two_fluid_exponent": 4.0,
        "applied_field_t": 0.02
    },
    "relax": {
        "dipole_field_t": 1.0e-4,
        "correlation_rate_hz": 1.0e6,
        "slr_constant": 0.05,
        "slr_exponent": 1.0,
        "surface_thickness_nm": 8.0,
        "surface_rate_hz": 12.0
    }
}"#;

fn calibration_table() -> StoppingProfileTable {
    let row = |energy_kev, alpha, beta, z_max_nm| CalibrationRow {
        energy_kev,
        alpha,
        alpha_error: 0.1,
        beta,
        beta_error: 0.1,
        z_max_nm,
        z_max_error_nm: 2.0,
    };
    StoppingProfileTable::from_rows(vec![
        row(5.0, 2.8, 5.2, 60.0),
        row(10.0, 3.0, 5.0, 100.0),
        row(20.0, 3.2, 4.8, 140.0),
        row(28.0, 3.3, 4.7, 180.0),
    ])
    .expect("valid table")
}

fn analyzer_from_fixture() -> DepthResolvedAnalyzer {
    let configuration: FitConfiguration =
        serde_json::from_str(FIT_CONFIGURATION_JSON).expect("fixture parses");
    DepthResolvedAnalyzer::new(calibration_table(), configuration.state, configuration.relax)
}

#[test]
fn configuration_fixture_deserializes_into_the_model_structs() {
    let configuration: FitConfiguration =
        serde_json::from_str(FIT_CONFIGURATION_JSON).expect("fixture parses");
    assert_eq!(configuration.state.critical_temperature_k, 9.25);
    assert_eq!(configuration.relax.surface_rate_hz, 12.0);
}

#[test]
fn three_argument_wrapper_sweeps_a_measurement_grid() {
    let mut analyzer = analyzer_from_fixture();
    let temperatures = [2.0, 4.5, 7.0, 12.0];
    let fields = [0.01, 0.02];
    let energies = [6.0, 12.0, 19.0, 26.0];

    for temperature in temperatures {
        for field in fields {
            for energy in energies {
                let rate = analyzer
                    .evaluate_at(temperature, field, energy)
                    .expect("grid point");
                assert!(
                    rate.is_finite() && rate > 0.0,
                    "non-physical rate at T={temperature} B={field} E={energy}: {rate}"
                );
            }
        }
    }
}

#[test]
fn mutating_state_between_calls_changes_only_subsequent_results() {
    let mut analyzer = analyzer_from_fixture();
    let cold = analyzer.evaluate_at(2.0, 0.02, 12.0).expect("cold");
    let cold_repeat = analyzer.evaluate(12.0).expect("cold repeat");
    assert_eq!(cold.to_bits(), cold_repeat.to_bits());

    analyzer.state.temperature_k = 8.0;
    let warmer = analyzer.evaluate(12.0).expect("warmer");
    assert_ne!(cold.to_bits(), warmer.to_bits());

    analyzer.state.temperature_k = 2.0;
    let cold_again = analyzer.evaluate(12.0).expect("cold again");
    assert_eq!(cold.to_bits(), cold_again.to_bits());
}

#[test]
fn independent_analyzers_from_shared_rows_agree() {
    // Parallel fitting wants one analyzer per worker; both must see the
    // same model.
    let first = analyzer_from_fixture();
    let second = analyzer_from_fixture();
    let a = first.evaluate(12.0).expect("first analyzer");
    let b = second.evaluate(12.0).expect("second analyzer");
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn rejected_parameter_points_leave_the_analyzer_usable() {
    let mut analyzer = analyzer_from_fixture();
    let good = analyzer.evaluate(12.0).expect("valid point");

    analyzer.state.penetration_depth_nm = -5.0;
    assert!(analyzer.evaluate(12.0).is_err());

    analyzer.state.penetration_depth_nm = 50.0;
    let recovered = analyzer.evaluate(12.0).expect("restored point");
    assert_eq!(good.to_bits(), recovered.to_bits());
}
