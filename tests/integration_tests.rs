use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

use prodmix::AppError;
use prodmix::generate::solve_instance;
use prodmix::instance::ProblemInstance;
use prodmix::lp_solver::{OptimizationSense, OptimizationStatus, SolverOptions, VariableType};
use prodmix::model::build_production_model;
use prodmix::{constraint, lp_model_builder};

// Helper function to run the prodmix binary
fn run_prodmix(output_dir: &Path, args: &[&str]) -> std::io::Result<std::process::Output> {
    Command::new(env!("CARGO_BIN_EXE_prodmix"))
        .args(args)
        .arg("--output-dir")
        .arg(output_dir)
        .output()
}

fn read_report(dir: &Path, n: u64, k: u64) -> String {
    let path = dir.join(format!("n{}_k{}.txt", n, k));
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

/// Part of a report that only depends on the seed (everything before the solver runs)
fn parameter_section(report: &str) -> &str {
    report.split("Model:").next().unwrap()
}

fn count_rows(report: &str, prefix: &str) -> usize {
    report
        .lines()
        .filter(|line| line.trim_start_matches('|').trim_start().starts_with(prefix))
        .count()
}

fn vector_lines(report: &str) -> Vec<&str> {
    report.lines().filter(|line| line.starts_with('[')).collect()
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    /// Five reports with two products each
    #[test]
    fn test_two_product_run_with_presolve() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let output = run_prodmix(temp_dir.path(), &["-i", "0", "-n", "2", "-p"])
            .expect("Failed to run prodmix");
        assert!(
            output.status.success(),
            "Command should succeed. stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        for k in 1..=5 {
            let report = read_report(temp_dir.path(), 2, k);

            let vectors = vector_lines(&report);
            assert_eq!(vectors.len(), 4, "report k={} should hold four vectors", k);
            for vector in vectors {
                assert_eq!(
                    vector.trim_matches(|c| c == '[' || c == ']').split(' ').count(),
                    2,
                    "vector {} should have two entries",
                    vector
                );
            }

            assert!(report.contains(" - parameters: presolve=on"));
            assert!(report.contains("solution for: n2_k"));
            assert_eq!(count_rows(&report, "x_"), 2, "report:\n{}", report);
            assert_eq!(count_rows(&report, "y_"), 2, "report:\n{}", report);
            assert!(report.contains("Nodes explored: "));
            assert!(report.contains("Solve time [s]: "));
        }

        assert!(!temp_dir.path().join("n2_k6.txt").exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 5);
    }

    /// Report sections appear in a fixed order
    #[test]
    fn test_report_section_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let output =
            run_prodmix(temp_dir.path(), &["-i", "3", "-n", "4"]).expect("Failed to run prodmix");
        assert!(output.status.success());

        let report = read_report(temp_dir.path(), 4, 1);
        let position = |needle: &str| {
            report
                .find(needle)
                .unwrap_or_else(|| panic!("missing {:?} in:\n{}", needle, report))
        };

        let order = [
            position("s_i - "),
            position("e_i - "),
            position("c_i - "),
            position("p_i - "),
            position("Model: n4_k1"),
            position("solution for: n4_k1"),
            position("Nodes explored: "),
            position("Solve time [s]: "),
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "report:\n{}", report);
        assert!(report.contains(" - parameters: presolve=off"));
    }

    /// Same arguments give the same instances
    #[test]
    fn test_runs_are_reproducible() {
        let first_dir = TempDir::new().expect("Failed to create temp dir");
        let second_dir = TempDir::new().expect("Failed to create temp dir");

        for dir in [&first_dir, &second_dir] {
            let output = run_prodmix(dir.path(), &["-i", "17", "-n", "3", "--no-p"])
                .expect("Failed to run prodmix");
            assert!(output.status.success());
        }

        for k in 1..=5 {
            let first = read_report(first_dir.path(), 3, k);
            let second = read_report(second_dir.path(), 3, k);
            assert_eq!(parameter_section(&first), parameter_section(&second));
        }

        // Consecutive iterations use different seeds
        assert_ne!(
            parameter_section(&read_report(first_dir.path(), 3, 1)),
            parameter_section(&read_report(first_dir.path(), 3, 2))
        );
    }

    /// Existing reports are replaced
    #[test]
    fn test_existing_reports_are_overwritten() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let stale = temp_dir.path().join("n2_k1.txt");
        fs::write(&stale, "stale content").expect("Failed to write stale report");

        let output =
            run_prodmix(temp_dir.path(), &["-i", "1", "-n", "2"]).expect("Failed to run prodmix");
        assert!(output.status.success());

        let report = fs::read_to_string(&stale).unwrap();
        assert!(!report.contains("stale content"));
        assert!(report.starts_with("s_i - "));
    }

    /// A negative base seed is accepted and drifts like any other
    #[test]
    fn test_negative_base_index() {
        let negative_dir = TempDir::new().expect("Failed to create temp dir");
        let positive_dir = TempDir::new().expect("Failed to create temp dir");

        // -i -3 -n 2 seeds 0, 4, 9, 15, 22; -i 1 -n 2 starts at 4
        let output = run_prodmix(negative_dir.path(), &["-i", "-3", "-n", "2"])
            .expect("Failed to run prodmix");
        assert!(
            output.status.success(),
            "Command should succeed. stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let output =
            run_prodmix(positive_dir.path(), &["-i", "1", "-n", "2"]).expect("Failed to run prodmix");
        assert!(output.status.success());

        assert_eq!(
            parameter_section(&read_report(negative_dir.path(), 2, 2)),
            parameter_section(&read_report(positive_dir.path(), 2, 1))
        );
        assert_eq!(fs::read_dir(negative_dir.path()).unwrap().count(), 5);
    }

    /// Missing or malformed arguments stop before any report is written
    #[test]
    fn test_argument_errors() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        for args in [
            vec!["-i", "0"],
            vec!["-n", "2"],
            vec!["-i", "x", "-n", "2"],
            vec!["-i", "0", "-n", "0"],
        ] {
            let output = run_prodmix(temp_dir.path(), &args).expect("Failed to run prodmix");
            assert!(!output.status.success(), "{:?} should be rejected", args);
            assert!(
                String::from_utf8_lossy(&output.stderr).contains("Usage"),
                "{:?} should print usage",
                args
            );
        }

        assert!(!temp_dir.path().join("n2_k1.txt").exists());
    }
}

#[cfg(test)]
mod solver_tests {
    use super::*;

    fn render(instance: &ProblemInstance, options: &SolverOptions) -> (OptimizationStatus, String) {
        let mut buffer = Vec::new();
        let status = solve_instance(&mut buffer, None, "fixture", instance, options)
            .expect("solving should not fail");
        (status, String::from_utf8(buffer).unwrap())
    }

    /// Negative budget: even producing nothing exceeds it
    #[test]
    fn test_infeasible_instance_reports_conflict() {
        let instance = ProblemInstance::from_parts(
            vec![1.0, 2.0],
            vec![4.0, 3.0],
            vec![80.0, 90.0],
            vec![10.0, 20.0],
            -1.0,
        )
        .unwrap();

        for presolve in [false, true] {
            let options = SolverOptions {
                presolve,
                ..Default::default()
            };
            let (status, report) = render(&instance, &options);

            assert_eq!(status, OptimizationStatus::Infeasible, "presolve={}", presolve);
            assert!(report.contains("Conflict set (1 constraint):"), "report:\n{}", report);
            assert!(report.contains("raw_material"));
            assert!(!report.contains("solution for:"));
            assert_eq!(count_rows(&report, "x_"), 0);
            assert!(report.contains("Solve time [s]: "));
        }
    }

    /// A zero budget still admits the empty production plan
    #[test]
    fn test_zero_budget_is_feasible() {
        let instance = ProblemInstance::from_parts(
            vec![1.0, 2.0],
            vec![4.0, 3.0],
            vec![80.0, 90.0],
            vec![10.0, 20.0],
            0.0,
        )
        .unwrap();

        let (status, report) = render(&instance, &SolverOptions::default());

        assert_eq!(status, OptimizationStatus::Optimal);
        assert!(report.contains("objective: 0.000000"), "report:\n{}", report);
        assert!(!report.contains("Conflict set"));
    }

    /// Only the first product fits in the budget
    #[test]
    fn test_known_optimum() {
        let instance = ProblemInstance::from_parts(
            vec![5.0, 2.5],
            vec![3.0, 4.0],
            vec![60.0, 10.0],
            vec![50.0, 20.0],
            60.0,
        )
        .unwrap();

        for presolve in [false, true] {
            let model = build_production_model(&instance, "known");
            let options = SolverOptions {
                presolve,
                ..Default::default()
            };
            let outcome = model.solve(&options, None).expect("solving should not fail");
            let solution = outcome.solution();

            assert_eq!(solution.status, OptimizationStatus::Optimal);
            assert!((solution.objective_value - 55.0).abs() < 1e-6);
            assert_eq!(solution.get_value(model.production[0]), Some(1.0));
            assert_eq!(solution.get_value(model.activation[0]), Some(1.0));
            assert_eq!(solution.get_value(model.production[1]), Some(0.0));
        }
    }

    /// Activation is free to stay off when nothing is produced
    #[test]
    fn test_unprofitable_products_stay_inactive() {
        let instance = ProblemInstance::from_parts(
            vec![9.0],
            vec![1.0],
            vec![5.0],
            vec![1.0],
            10.0,
        )
        .unwrap();

        let model = build_production_model(&instance, "unprofitable");
        let outcome = model.solve(&SolverOptions::default(), None).unwrap();
        let solution = outcome.solution();

        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert_eq!(solution.get_value(model.production[0]), Some(0.0));
        assert_eq!(solution.get_value(model.activation[0]), Some(0.0));
        assert!(solution.objective_value.abs() < 1e-6);
    }

    /// Refinement is only defined for infeasible models
    #[test]
    fn test_refining_feasible_model_fails() {
        let instance =
            ProblemInstance::from_parts(vec![1.0], vec![1.0], vec![10.0], vec![1.0], 5.0)
                .unwrap();
        let model = build_production_model(&instance, "feasible");

        let err = model
            .builder
            .refine_conflict(&SolverOptions::default())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<AppError>(),
            Some(&AppError::NotInfeasible)
        );
    }

    /// The solver log of the main solve goes into the report file, between the
    /// model summary and the solution
    #[test]
    fn test_solver_log_is_captured_into_report() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("fixture.txt");
        let instance = ProblemInstance::from_parts(
            vec![5.0, 2.5],
            vec![3.0, 4.0],
            vec![60.0, 10.0],
            vec![50.0, 20.0],
            60.0,
        )
        .unwrap();

        let file = fs::File::create(&path).unwrap();
        let mut writer = std::io::BufWriter::new(&file);
        let status = solve_instance(
            &mut writer,
            Some(&file),
            "fixture",
            &instance,
            &SolverOptions::default(),
        )
        .expect("solving should not fail");
        std::io::Write::flush(&mut writer).unwrap();
        drop(writer);
        drop(file);

        assert_eq!(status, OptimizationStatus::Optimal);

        let report = fs::read_to_string(&path).unwrap();
        let summary_end = report.find(" - problem type is: MILP").unwrap();
        let solution_start = report.find("solution for: fixture").unwrap();
        assert!(report.starts_with("s_i - "));
        assert!(summary_end < solution_start, "report:\n{}", report);
        assert!(report.contains("objective: 55.000000"), "report:\n{}", report);
        assert_eq!(count_rows(&report, "x_"), 2);
        assert!(report.contains("Solve time [s]: "));
    }

    /// Refinement trial solves stay silent after the log redirect is released
    #[test]
    fn test_infeasible_report_with_captured_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("infeasible.txt");
        let instance =
            ProblemInstance::from_parts(vec![1.0], vec![4.0], vec![80.0], vec![10.0], -1.0)
                .unwrap();

        let file = fs::File::create(&path).unwrap();
        let mut writer = std::io::BufWriter::new(&file);
        let status = solve_instance(
            &mut writer,
            Some(&file),
            "infeasible",
            &instance,
            &SolverOptions::default(),
        )
        .expect("solving should not fail");
        std::io::Write::flush(&mut writer).unwrap();
        drop(writer);

        assert_eq!(status, OptimizationStatus::Infeasible);
        let report = fs::read_to_string(&path).unwrap();
        assert!(report.contains("Conflict set (1 constraint):"), "report:\n{}", report);
        assert!(report.contains("raw_material"));
    }

    /// The reported objective is the solver's, constant term included
    #[test]
    fn test_objective_includes_constant() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Integer, 0.0, f64::INFINITY);
        builder.add_constraint(constraint!("cap", (x) <= 3.0));
        builder.set_objective(1.5 * x + 2.0, OptimizationSense::Maximize);

        let solution = builder
            .solve_with(&SolverOptions::default())
            .expect("solving should not fail");

        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert_eq!(solution.get_value(x), Some(3.0));
        assert!((solution.objective_value - 6.5).abs() < 1e-6);
    }
}
