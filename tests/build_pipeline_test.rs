//! End-to-end build pipeline tests.
//!
//! Each test drives `GGPlot::build_with_warnings` from a plot specification
//! to the final per-layer tables (and, where it matters, the draw commands)
//! with a private `WarningLog` so warnings can be asserted on.
//!
//! Run: cargo test --test build_pipeline_test

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_relative_eq;
use trueno_gg::grammar::{
    Aes, Column, Facet, FacetScales, GGPlot, Geom, Layer, Limits, Position, Scale, Stat, StatContext,
    StatTransform, Table, Trans, WarningLog,
};
use trueno_gg::render::{CommandRecorder, DrawCommand};
use trueno_gg::Error;

fn ab_table() -> Table {
    Table::new()
        .with_column("a", Column::continuous([1.0, 2.0]))
        .unwrap()
        .with_column("b", Column::continuous([2.0, 3.0]))
        .unwrap()
}

fn group_ids(table: &Table) -> BTreeSet<u32> {
    table.numbers("group").unwrap().into_iter().map(|g| g.unwrap() as u32).collect()
}

// ============================================================================
// Core scenarios
// ============================================================================

#[test]
fn identity_layer_resolves_positions_and_single_group() {
    let built = GGPlot::new()
        .data(ab_table())
        .aes(Aes::new().x("a").y("b"))
        .geom(Geom::point())
        .build_with_warnings(&WarningLog::new())
        .unwrap();

    assert_eq!(built.layout().len(), 1);
    let table = built.layer_data(0).unwrap();
    assert_eq!(table.nrow(), 2);
    assert_eq!(table.numbers("x").unwrap(), vec![Some(1.0), Some(2.0)]);
    assert_eq!(table.numbers("y").unwrap(), vec![Some(2.0), Some(3.0)]);
    assert_eq!(table.numbers("group").unwrap(), vec![Some(1.0), Some(1.0)]);
    assert_eq!(table.numbers("PANEL").unwrap(), vec![Some(1.0), Some(1.0)]);
}

#[test]
fn discrete_color_splits_groups() {
    let data = ab_table().with_column("c", Column::discrete(["red", "blue"])).unwrap();
    let built = GGPlot::new()
        .data(data)
        .aes(Aes::new().x("a").y("b").color("c"))
        .geom(Geom::point())
        .build_with_warnings(&WarningLog::new())
        .unwrap();

    let table = built.layer_data(0).unwrap();
    assert_eq!(group_ids(table).len(), 2);
    let colors = table.get("color").unwrap().values();
    assert_ne!(colors[0], colors[1]);
    assert!(colors.iter().all(|c| c.as_str().is_some_and(|s| s.starts_with('#'))));
}

#[test]
fn hline_spans_expanded_x_range() {
    let warnings = WarningLog::new();
    let built = GGPlot::new()
        .data_xy(&[0.0, 5.0, 10.0], &[1.0, 2.0, 3.0])
        .geom(Geom::point())
        .geom(Geom::hline(5.0))
        .build_with_warnings(&warnings)
        .unwrap();

    let (lo, hi) = built.panel().x_scale(1).unwrap().coord_range().unwrap();
    assert!(lo < 0.0 && hi > 10.0);

    let hline = built.layer_data(1).unwrap();
    assert_eq!(hline.nrow(), 1);
    assert_eq!(hline.numbers("yintercept").unwrap(), vec![Some(5.0)]);

    let mut recorder = CommandRecorder::new();
    built.render_with_warnings(&mut recorder, &warnings).unwrap();
    let spans: Vec<&DrawCommand> = recorder.layer(1).collect();
    assert_eq!(spans.len(), 1);
    match spans[0] {
        DrawCommand::HorizontalSpan { y, x0, x1, .. } => {
            assert_relative_eq!(*y, 5.0);
            assert_relative_eq!(*x0, lo);
            assert_relative_eq!(*x1, hi);
            assert_relative_eq!(*x0, -0.5, epsilon = 1e-5);
            assert_relative_eq!(*x1, 10.5, epsilon = 1e-5);
        }
        other => panic!("expected a horizontal span, got {other:?}"),
    }
}

#[test]
fn pixel_recorder_maps_span_to_panel_edges() {
    let warnings = WarningLog::new();
    let built = GGPlot::new()
        .data_xy(&[0.0, 5.0, 10.0], &[1.0, 2.0, 3.0])
        .geom(Geom::point())
        .geom(Geom::hline(2.0))
        .dimensions(800, 600)
        .build_with_warnings(&warnings)
        .unwrap();

    let mut recorder = CommandRecorder::in_pixels();
    built.render_with_warnings(&mut recorder, &warnings).unwrap();
    let area = recorder.frames()[0].area;
    let spans: Vec<&DrawCommand> = recorder.layer(1).collect();
    assert_eq!(spans.len(), 1);
    match spans[0] {
        DrawCommand::HorizontalSpan { y, x0, x1, .. } => {
            assert_relative_eq!(*x0, area.x, epsilon = 1e-3);
            assert_relative_eq!(*x1, area.right(), epsilon = 1e-3);
            assert!(*y > area.y && *y < area.bottom());
        }
        other => panic!("expected a horizontal span, got {other:?}"),
    }
    for command in recorder.layer(0) {
        let DrawCommand::Point { at, .. } = command else { panic!("expected points") };
        assert!(at.x >= area.x && at.x <= area.right());
        assert!(at.y >= area.y && at.y <= area.bottom());
    }
}

#[test]
fn weighted_mean_without_weight_fails() {
    let err = GGPlot::new()
        .data_xy(&[1.0, 2.0], &[3.0, 4.0])
        .geom(Geom::point().stat(Stat::weighted_mean()))
        .build_with_warnings(&WarningLog::new())
        .unwrap_err();
    assert_eq!(
        err,
        Error::MissingAesthetic { stat: "stat_weighted_mean".into(), missing: vec!["weight".into()] }
    );
}

#[test]
fn weighted_mean_with_weight_column() {
    let data = Table::from_xy(&[1.0, 1.0, 2.0], &[2.0, 4.0, 6.0])
        .with_column("w", Column::continuous([1.0, 3.0, 1.0]))
        .unwrap();
    let built = GGPlot::new()
        .data(data)
        .aes(Aes::new().x("x").y("y").weight("w"))
        .geom(Geom::point().stat(Stat::weighted_mean()))
        .build_with_warnings(&WarningLog::new())
        .unwrap();
    let table = built.layer_data(0).unwrap();
    assert_eq!(table.numbers("y").unwrap(), vec![Some(3.5), Some(6.0)]);
}

#[test]
fn no_layers_fails() {
    let err = GGPlot::new().data(ab_table()).build_with_warnings(&WarningLog::new()).unwrap_err();
    assert_eq!(err, Error::NoLayers);
}

#[test]
fn constant_of_wrong_length_fails() {
    let err = GGPlot::new()
        .data_xy(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0])
        .layer(Layer::new(Geom::point()).aes(Aes::new().set_values("size", Column::continuous([1.0, 2.0]))))
        .build_with_warnings(&WarningLog::new())
        .unwrap_err();
    assert_eq!(err, Error::DataLength { aesthetic: "size".into(), len: 2, rows: 3 });
}

#[test]
fn unknown_computed_aesthetic_fails() {
    let err = GGPlot::new()
        .data_xy(&[1.0, 2.0], &[1.0, 2.0])
        .layer(Layer::new(Geom::point()).aes(Aes::new().map("size", "..density..")))
        .build_with_warnings(&WarningLog::new())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownAesthetic { ref aesthetic, .. } if aesthetic == "size"));
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Debug, Default)]
struct CountingIdentity {
    calls: Arc<AtomicUsize>,
}

impl StatTransform for CountingIdentity {
    fn name(&self) -> &str {
        "stat_counting_identity"
    }

    fn compute_group(&self, data: &Table, _ctx: &StatContext<'_>) -> trueno_gg::Result<Table> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!data.is_empty());
        Ok(data.clone())
    }
}

#[test]
fn stat_never_sees_empty_data() {
    let calls = Arc::new(AtomicUsize::new(0));
    let empty = Table::new()
        .with_column("x", Column::continuous(Vec::<f32>::new()))
        .unwrap()
        .with_column("y", Column::continuous(Vec::<f32>::new()))
        .unwrap();
    let stat = Stat::custom(CountingIdentity { calls: Arc::clone(&calls) });

    let built = GGPlot::new()
        .data_xy(&[1.0, 2.0], &[1.0, 2.0])
        .geom(Geom::point())
        .layer(Layer::new(Geom::point()).data(empty).stat(stat))
        .build_with_warnings(&WarningLog::new())
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(built.layer_data(1).unwrap().is_empty());
}

#[test]
fn custom_stat_runs_once_per_group() {
    let calls = Arc::new(AtomicUsize::new(0));
    let data = Table::from_xy(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0])
        .with_column("g", Column::discrete(["a", "b", "a"]))
        .unwrap();
    GGPlot::new()
        .data(data)
        .aes(Aes::new().x("x").y("y").group("g"))
        .geom(Geom::point().stat(Stat::custom(CountingIdentity { calls: Arc::clone(&calls) })))
        .build_with_warnings(&WarningLog::new())
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn histogram_counts_every_row() {
    let xs: Vec<f32> = (0..=10).map(|i| i as f32).collect();
    let built = GGPlot::new()
        .data(Table::from_xy(&xs, &xs))
        .aes(Aes::new().x("x"))
        .geom(Geom::histogram(5))
        .build_with_warnings(&WarningLog::new())
        .unwrap();

    let table = built.layer_data(0).unwrap();
    assert_eq!(table.nrow(), 5);
    let total: f32 = table.numbers("y").unwrap().into_iter().flatten().sum();
    assert_relative_eq!(total, 11.0);
    assert_eq!(built.panel().y_scale(1).unwrap().get_limits().unwrap(), Limits::Continuous(0.0, 3.0));
    assert_eq!(built.panel().x_scale(1).unwrap().get_limits().unwrap(), Limits::Continuous(0.0, 10.0));
}

#[test]
fn default_binwidth_warns_once() {
    let warnings = WarningLog::new();
    let plot = GGPlot::new()
        .data(Table::from_xy(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]))
        .aes(Aes::new().x("x"))
        .geom(Geom::bar().stat(Stat::Bin { bins: None, binwidth: None }));

    plot.build_with_warnings(&warnings).unwrap();
    plot.build_with_warnings(&warnings).unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings.contains("stat_bin: binwidth defaulted to range/30"));
}

#[test]
fn zero_bins_fall_back_to_one_bin() {
    let built = GGPlot::new()
        .data(Table::from_xy(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]))
        .aes(Aes::new().x("x"))
        .layer(Layer::new(Geom::point()).stat(Stat::Bin { bins: Some(0), binwidth: None }))
        .build_with_warnings(&WarningLog::new())
        .unwrap();
    let table = built.layer_data(0).unwrap();
    assert_eq!(table.nrow(), 1);
    assert_eq!(table.numbers("y").unwrap(), vec![Some(3.0)]);
}

#[test]
fn excessive_bin_count_fails() {
    let err = GGPlot::new()
        .data(Table::from_xy(&[0.0, 1000.0], &[0.0, 0.0]))
        .aes(Aes::new().x("x"))
        .geom(Geom::bar().stat(Stat::bin_width(1e-6)))
        .build_with_warnings(&WarningLog::new())
        .unwrap_err();
    assert!(matches!(err, Error::Stat { ref stat, .. } if stat == "stat_bin"));
}

#[test]
fn binning_discrete_x_fails() {
    let data = Table::new().with_column("x", Column::discrete(["a", "b"])).unwrap();
    let err = GGPlot::new()
        .data(data)
        .aes(Aes::new().x("x"))
        .geom(Geom::histogram(4))
        .build_with_warnings(&WarningLog::new())
        .unwrap_err();
    assert!(matches!(err, Error::Stat { ref stat, .. } if stat == "stat_bin"));
}

// ============================================================================
// Scales and positions
// ============================================================================

#[test]
fn log10_scale_transforms_before_training() {
    let built = GGPlot::new()
        .data_xy(&[1.0, 2.0, 3.0], &[1.0, 10.0, 100.0])
        .scale(Scale::y_continuous().trans(Trans::Log10))
        .geom(Geom::point())
        .build_with_warnings(&WarningLog::new())
        .unwrap();
    let ys: Vec<f32> = built.layer_data(0).unwrap().numbers("y").unwrap().into_iter().flatten().collect();
    assert_eq!(ys.len(), 3);
    assert_relative_eq!(ys[0], 0.0, epsilon = 1e-5);
    assert_relative_eq!(ys[1], 1.0, epsilon = 1e-5);
    assert_relative_eq!(ys[2], 2.0, epsilon = 1e-5);
}

#[test]
fn stacked_bars_render_one_region_per_row() {
    let data = Table::new()
        .with_column("x", Column::discrete(["a", "a", "b", "b", "b"]))
        .unwrap()
        .with_column("g", Column::discrete(["u", "v", "u", "v", "v"]))
        .unwrap();
    let warnings = WarningLog::new();
    let built = GGPlot::new()
        .data(data)
        .aes(Aes::new().x("x").fill("g"))
        .geom(Geom::bar())
        .build_with_warnings(&warnings)
        .unwrap();

    let table = built.layer_data(0).unwrap();
    assert_eq!(table.nrow(), 4);
    let top: f32 = table.numbers("ymax").unwrap().into_iter().flatten().fold(0.0, f32::max);
    assert_relative_eq!(top, 3.0);

    let mut recorder = CommandRecorder::new();
    built.render_with_warnings(&mut recorder, &warnings).unwrap();
    assert_eq!(recorder.layer(0).filter(|c| matches!(c, DrawCommand::FilledRegion { .. })).count(), 4);
}

#[test]
fn dodge_keeps_bars_inside_slot() {
    let data = Table::from_xy(&[1.0, 1.0], &[2.0, 3.0])
        .with_column("g", Column::discrete(["u", "v"]))
        .unwrap();
    let built = GGPlot::new()
        .data(data)
        .aes(Aes::new().x("x").y("y").fill("g"))
        .geom(Geom::col().position(Position::dodge()))
        .build_with_warnings(&WarningLog::new())
        .unwrap();
    let table = built.layer_data(0).unwrap();
    let xmin: Vec<f32> = table.numbers("xmin").unwrap().into_iter().flatten().collect();
    let xmax: Vec<f32> = table.numbers("xmax").unwrap().into_iter().flatten().collect();
    for (lo, hi) in xmin.iter().zip(&xmax) {
        assert!(*lo >= 0.55 - 1e-5 && *hi <= 1.45 + 1e-5);
        assert_relative_eq!(hi - lo, 0.45, epsilon = 1e-5);
    }
}

#[test]
fn jitter_on_discrete_axis_widens_coord_range() {
    let data = Table::new()
        .with_column("x", Column::discrete(["a", "b", "a"]))
        .unwrap()
        .with_column("y", Column::continuous([1.0, 2.0, 3.0]))
        .unwrap();
    let plot = GGPlot::new()
        .data(data)
        .aes(Aes::new().x("x").y("y"))
        .geom(Geom::point().position(Position::jitter()));
    let built = plot.build_with_warnings(&WarningLog::new()).unwrap();

    let xs: Vec<f32> = built.layer_data(0).unwrap().numbers("x").unwrap().into_iter().flatten().collect();
    assert_eq!(xs.len(), 3);
    for (x, code) in xs.iter().zip([1.0f32, 2.0, 1.0]) {
        assert!((x - code).abs() <= 0.4 + 1e-5);
    }

    let scale = built.panel().x_scale(1).unwrap();
    assert_eq!(scale.get_limits().unwrap(), Limits::Discrete(vec!["a".into(), "b".into()]));
    let lo = xs.iter().copied().fold(1.0f32, f32::min);
    let hi = xs.iter().copied().fold(2.0f32, f32::max);
    let (range_lo, range_hi) = scale.coord_range().unwrap();
    assert_relative_eq!(range_lo, lo - 0.6, epsilon = 1e-5);
    assert_relative_eq!(range_hi, hi + 0.6, epsilon = 1e-5);

    let again = plot.build_with_warnings(&WarningLog::new()).unwrap();
    assert_eq!(built.data(), again.data());
}

#[test]
fn discrete_scale_without_training_is_unresolved() {
    let scale = Scale::discrete("color");
    assert_eq!(scale.get_limits().unwrap_err(), Error::UnresolvedScale { aesthetic: "color".into() });
}

// ============================================================================
// Facets
// ============================================================================

fn faceted_data() -> Table {
    Table::from_xy(&[1.0, 2.0, 30.0, 40.0], &[1.0, 2.0, 3.0, 4.0])
        .with_column("g", Column::discrete(["a", "a", "b", "b"]))
        .unwrap()
}

#[test]
fn facet_wrap_assigns_every_row_a_panel() {
    let plot = GGPlot::new()
        .data(faceted_data())
        .aes(Aes::new().x("x").y("y"))
        .geom(Geom::point())
        .facet(Facet::wrap("g", 2));

    let first = plot.build_with_warnings(&WarningLog::new()).unwrap();
    let second = plot.build_with_warnings(&WarningLog::new()).unwrap();

    assert_eq!(first.layout().len(), 2);
    let panels = first.layer_data(0).unwrap().numbers("PANEL").unwrap();
    assert!(panels.iter().all(Option::is_some));
    assert_eq!(panels, vec![Some(1.0), Some(1.0), Some(2.0), Some(2.0)]);
    assert_eq!(first.data(), second.data());
}

#[test]
fn free_x_scales_train_per_panel() {
    let built = GGPlot::new()
        .data(faceted_data())
        .aes(Aes::new().x("x").y("y"))
        .geom(Geom::point())
        .facet(Facet::wrap("g", 2).scales(FacetScales::FreeX))
        .build_with_warnings(&WarningLog::new())
        .unwrap();
    let panel = built.panel();
    assert_eq!(panel.x_scale(1).unwrap().get_limits().unwrap(), Limits::Continuous(1.0, 2.0));
    assert_eq!(panel.x_scale(2).unwrap().get_limits().unwrap(), Limits::Continuous(30.0, 40.0));
    assert_eq!(panel.y_scale(1).unwrap().get_limits().unwrap(), Limits::Continuous(1.0, 4.0));

    let mut recorder = CommandRecorder::new();
    built.render_with_warnings(&mut recorder, &WarningLog::new()).unwrap();
    assert_eq!(recorder.frames().len(), 2);
    assert_eq!(recorder.panel(2).count(), 2);
}

#[test]
fn reference_line_repeats_in_every_panel() {
    let warnings = WarningLog::new();
    let built = GGPlot::new()
        .data(faceted_data())
        .aes(Aes::new().x("x").y("y"))
        .geom(Geom::point())
        .geom(Geom::hline(2.5))
        .facet(Facet::wrap("g", 2))
        .build_with_warnings(&warnings)
        .unwrap();

    let hline = built.layer_data(1).unwrap();
    assert_eq!(hline.numbers("PANEL").unwrap(), vec![Some(1.0), Some(2.0)]);
    assert_eq!(hline.numbers("yintercept").unwrap(), vec![Some(2.5), Some(2.5)]);

    let mut recorder = CommandRecorder::new();
    built.render_with_warnings(&mut recorder, &warnings).unwrap();
    for panel in [1, 2] {
        let spans = recorder.panel(panel).filter(|c| matches!(c, DrawCommand::HorizontalSpan { .. })).count();
        assert_eq!(spans, 1, "panel {panel}");
    }
}

#[test]
fn missing_facet_variable_fails() {
    let err = GGPlot::new()
        .data_xy(&[1.0], &[1.0])
        .geom(Geom::point())
        .facet(Facet::wrap("nope", 2))
        .build_with_warnings(&WarningLog::new())
        .unwrap_err();
    assert_eq!(err, Error::MissingFacetVariable { variable: "nope".into() });
}
