//! End-to-end tests exercising the library's public API and the concrete scenarios of
//! the testable-properties section.

use trading_lb::annotation::{Annotation, Enumerator, Step};
use trading_lb::lp::Builder;
use trading_lb::options::SearchOptions;
use trading_lb::solver::{FeasibilityStatus, LpBackend, MinilpBackend};
use trading_lb::{run_search, run_tabulation};

fn catalan(n: u64) -> u64 {
    let mut c = vec![0u64; n as usize + 1];
    c[0] = 1;
    for i in 1..=n as usize {
        for j in 0..i {
            c[i] += c[j] * c[i - 1 - j];
        }
    }
    c[n as usize]
}

#[test]
fn enumerator_cardinality_matches_catalan_numbers_across_lengths() {
    for &length in &[3usize, 5, 7, 9, 11, 13] {
        let expected = catalan(((length - 1) / 2) as u64);
        let count = Enumerator::new(length).unwrap().count() as u64;
        assert_eq!(count, expected, "length {}", length);
    }
}

#[test]
fn length_five_enumeration_is_the_two_expected_annotations() {
    let annotations: Vec<String> = Enumerator::new(5)
        .unwrap()
        .map(|a| a.to_string())
        .collect();
    assert_eq!(annotations.len(), 2);
    assert!(annotations.contains(&"11000".to_owned()));
    assert!(annotations.contains(&"10100".to_owned()));
}

#[test]
fn length_three_trivial_annotation_is_feasible_at_c_one() {
    let annotation =
        Annotation::new(vec![Step::Speedup2, Step::Slowdown, Step::Slowdown]).unwrap();
    let instance = Builder::build(&annotation, 1.0, 1.0).unwrap();
    let status = MinilpBackend.solve(&instance).unwrap();
    assert!(matches!(status, FeasibilityStatus::Feasible(_)));
}

#[test]
fn length_three_trivial_annotation_is_infeasible_at_c_two() {
    let annotation =
        Annotation::new(vec![Step::Speedup2, Step::Slowdown, Step::Slowdown]).unwrap();
    let instance = Builder::build(&annotation, 2.0, 1.0).unwrap();
    let status = MinilpBackend.solve(&instance).unwrap();
    assert!(matches!(status, FeasibilityStatus::Infeasible));
}

#[test]
fn run_search_over_nine_lines_finds_a_global_best_above_one() {
    // proof-length 10 lines -> annotation length L = 9, the concrete scenario from the
    // testable-properties section: the search should clear the trivial c = 1 baseline.
    let options = SearchOptions {
        proof_length: Some(10),
        ..SearchOptions::default()
    };
    let result = run_search(&options).unwrap();
    let best_c = result.driver_result.best_c.unwrap();
    assert!(best_c > 1.0, "expected a nontrivial best c, got {}", best_c);
    assert!(!result.driver_result.best_results.is_empty());
}

#[test]
fn tabulation_produces_a_row_for_every_even_length_in_range() {
    let options = SearchOptions {
        tabulate_from: Some(4),
        tabulate_to: Some(10),
        search_cap: 2,
        search_depth: 4,
        ..SearchOptions::default()
    };
    let rows = run_tabulation(&options).unwrap();
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert!(row.best_c.is_some());
    }
}

#[test]
fn rendered_proof_can_be_written_to_and_read_back_from_a_file() {
    use std::io::Write as _;

    let options = SearchOptions {
        proof_length: Some(4),
        ..SearchOptions::default()
    };
    let result = run_search(&options).unwrap();
    let text = result.to_string();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", text).unwrap();
    let contents = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(contents, text);
}

#[test]
fn ties_in_best_c_are_all_preserved() {
    use trading_lb::driver::run;
    use trading_lb::search::SearchConfig;

    // An annotation's result is tied with itself trivially; the driver must not drop
    // duplicate-valued results when more than one annotation reaches the same best c.
    let config = SearchConfig::default();
    let result = run(&MinilpBackend, 5, &config).unwrap();
    if let Some(best) = result.best_c {
        for tied in &result.best_results {
            assert!((tied.best_c.unwrap() - best).abs() < 1e-6);
        }
    }
}
