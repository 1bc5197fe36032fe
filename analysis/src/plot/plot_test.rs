use super::{Figure, PlotError, COMBINED_COLOR, SCATTER_COLOR};
use crate::{
    config::{AnalysisConfig, ColumnLayout, PlotConfig},
    dataset::{
        pairing::{ConstraintSelector, PairingError, SolverFilter},
        BenchmarkDataset,
    },
    test_util::{instance, F, T},
};
use std::fs;

fn dataset() -> BenchmarkDataset {
    BenchmarkDataset::from_instances(
        &ColumnLayout::compact(),
        vec![
            instance(
                0,
                &[
                    (&[F, T, F, F, F], &[("z3", 1.0), ("cvc5", 8.0)]),
                    (&[F, F, F, F, F], &[("z3", 2.0), ("cvc5", 0.5)]),
                ],
            ),
            instance(
                1,
                &[
                    (&[F, T, T, F, F], &[("z3", 0.25), ("cvc5", 3.0)]),
                    (&[F, F, T, F, F], &[("z3", 6.0), ("cvc5", 1.0)]),
                ],
            ),
        ],
    )
}

#[test]
pub fn compare_all_uses_configured_names() {
    let names = AnalysisConfig::default().constraints;
    let filter = SolverFilter::Only(vec!["z3".to_owned(), "cvc5".to_owned()]);
    let pairing = dataset().pair(1, &filter).unwrap();

    let figure = Figure::compare_all(&pairing, &filter, &names, true);

    assert_eq!(figure.panels.len(), 3);
    assert_eq!(figure.panels[0].title, "Time comparison for z3");
    assert_eq!(figure.panels[0].x_label, "Time when distinct");
    assert_eq!(figure.panels[0].y_label, "Time when PbEq");
    assert_eq!(figure.panels[0].color, SCATTER_COLOR);
    assert_eq!(figure.panels[1].title, "Time comparison for cvc5");

    let combined = &figure.panels[2];
    assert_eq!(combined.title, "Combined Time Comparison for All Solvers");
    assert_eq!(combined.x_label, "Time when distinct (All Solvers)");
    assert_eq!(combined.samples.len(), 4);
    assert_eq!(combined.color, COMBINED_COLOR);
}

#[test]
pub fn compare_all_falls_back_to_generic_labels() {
    let pairing = dataset().pair(1, &SolverFilter::All).unwrap();
    let figure = Figure::compare_all(&pairing, &SolverFilter::All, &[], false);

    // solvers in name order when none are selected
    assert_eq!(figure.panels.len(), 2);
    assert_eq!(figure.panels[0].title, "Time comparison for cvc5");
    assert_eq!(figure.panels[0].x_label, "Time when constraint 1 is True");
    assert_eq!(figure.panels[0].y_label, "Time when constraint 1 is False");
}

#[test]
pub fn compare_all_keeps_an_empty_panel_for_unknown_solvers() {
    let filter = SolverFilter::Only(vec!["z3".to_owned(), "yices".to_owned()]);
    let pairing = dataset().pair(1, &filter).unwrap();
    let figure = Figure::compare_all(&pairing, &filter, &[], false);

    assert_eq!(figure.panels.len(), 2);
    assert!(figure.panels[1].samples.is_empty());
}

#[test]
pub fn compare_all_draws_repeated_solvers_once() {
    let filter = SolverFilter::Only(vec!["z3".to_owned(), "z3".to_owned()]);
    let pairing = dataset().pair(1, &filter).unwrap();
    let figure = Figure::compare_all(&pairing, &filter, &[], true);

    assert_eq!(figure.panels.len(), 2);
    assert_eq!(figure.panels[0].samples.len(), 2);
    assert_eq!(figure.panels[1].samples.len(), 2);
}

#[test]
pub fn compare_named_titles_follow_the_selected_side() {
    let names = AnalysisConfig::default().constraints;
    let filter = SolverFilter::Only(vec!["z3".to_owned()]);
    let (resolved, pairing) = dataset()
        .pair_selected(&ConstraintSelector::Name("PbEq".to_owned()), &names, &filter)
        .unwrap();

    let figure = Figure::compare_named(&pairing, resolved, &names, "z3").unwrap();
    let panel = &figure.panels[0];

    assert_eq!(panel.title, "Time Comparison: Constraint PbEq vs distinct (z3)");
    assert_eq!(panel.x_label, "Time when PbEq");
    assert_eq!(panel.y_label, "Time when distinct");
    assert_eq!(panel.samples.truthy(), vec![2.0, 6.0]);
}

#[test]
pub fn compare_index_requires_the_solver() {
    let pairing = dataset()
        .pair(1, &SolverFilter::Only(vec!["z3".to_owned()]))
        .unwrap();

    let figure = Figure::compare_index(&pairing, "distinct", "z3").unwrap();
    assert_eq!(figure.panels[0].title, "Time Comparison: Constraint distinct - z3");
    assert_eq!(figure.panels[0].x_label, "Time when constraint distinct is True");

    assert!(matches!(
        Figure::compare_index(&pairing, "distinct", "cvc5"),
        Err(PlotError::Pairing(PairingError::NoMatchedPairs { .. }))
    ));
}

#[test]
pub fn render_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compare.svg");
    let pairing = dataset().pair(1, &SolverFilter::All).unwrap();
    let figure = Figure::compare_all(&pairing, &SolverFilter::All, &[], true);

    figure.render(&path, &PlotConfig::default()).unwrap();

    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Time comparison for z3"));
    assert!(svg.contains("Combined Time Comparison for All Solvers"));
}

#[test]
pub fn render_rejects_invalid_line_style() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PlotConfig::default();
    config.line_style = "q~".to_owned();

    let result = Figure::default().render(&dir.path().join("empty.svg"), &config);

    assert!(matches!(result, Err(PlotError::Style(_))));
}
