use chonker_tables::grid::{bin_text_runs, detect_grids, extract_lines, merge_candidates};
use chonker_tables::pipeline::PageDump;
use chonker_tables::{
    extract_document_tables, extract_page_tables, BoundingBox, DetectionConfig, PageContent, PathOp,
    TableConfig, TextRun,
};

fn ruled_grid(ys: &[f64], xs: &[f64]) -> Vec<PathOp> {
    let (left, right) = (xs[0], xs[xs.len() - 1]);
    let (top, bottom) = (ys[0], ys[ys.len() - 1]);
    let mut ops = Vec::new();
    for &y in ys {
        ops.push(PathOp::MoveTo { x: left, y });
        ops.push(PathOp::LineTo { x: right, y });
    }
    for &x in xs {
        ops.push(PathOp::MoveTo { x, y: top });
        ops.push(PathOp::LineTo { x, y: bottom });
    }
    ops
}

fn page(operators: Vec<PathOp>, text_runs: Vec<TextRun>) -> PageContent {
    PageContent { page_number: 1, operators, text_runs }
}

#[test]
fn test_scenario_a_single_three_by_three_grid() {
    let config = DetectionConfig::default();
    let ops = ruled_grid(&[0.0, 30.0, 60.0], &[0.0, 50.0, 100.0]);

    let regions = merge_candidates(&detect_grids(&extract_lines(&ops, config.line_tolerance), &config));
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].row_count, 3);
    assert_eq!(regions[0].col_count, 3);
    assert_eq!(regions[0].bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 60.0));

    let cells = bin_text_runs(
        &regions[0],
        &[TextRun::new("top-left", 5.0, 5.0), TextRun::new("bottom-right", 95.0, 55.0)],
    );
    assert_eq!(cells[&(0, 0)], "top-left");
    assert_eq!(cells[&(2, 2)], "bottom-right");

    let tables = extract_page_tables(
        &page(ops, vec![TextRun::new("top-left", 5.0, 5.0), TextRun::new("bottom-right", 95.0, 55.0)]),
        &config,
    );
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].header_row, vec!["top-left", "", ""]);
    assert_eq!(tables[0].data_rows, vec![vec!["", "", ""], vec!["", "", "bottom-right"]]);
}

#[test]
fn test_scenario_b_two_separate_grids() {
    let mut ops = ruled_grid(&[0.0, 30.0, 60.0], &[0.0, 50.0, 100.0]);
    ops.extend(ruled_grid(&[300.0, 330.0, 360.0], &[300.0, 350.0, 400.0]));

    let tables = extract_page_tables(&page(ops, Vec::new()), &DetectionConfig::default());
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 60.0));
    assert_eq!(tables[1].bounding_box, BoundingBox::new(300.0, 300.0, 400.0, 360.0));
    assert_eq!(tables[1].id, "table_1_1");
}

#[test]
fn test_scenario_b_side_by_side_grids() {
    let mut ops = ruled_grid(&[0.0, 30.0, 60.0], &[0.0, 50.0, 100.0]);
    ops.extend(ruled_grid(&[0.0, 30.0, 60.0], &[400.0, 450.0, 500.0]));

    let tables = extract_page_tables(&page(ops, Vec::new()), &DetectionConfig::default());
    assert_eq!(tables.len(), 2);
    assert!(tables.iter().all(|t| t.row_count() == 3 && t.column_count() == 3));
}

#[test]
fn test_scenario_c_duplicate_detections_merge() {
    let config = DetectionConfig::default();
    let ops = ruled_grid(&[0.0, 25.0, 50.0, 75.0], &[0.0, 40.0, 80.0, 120.0]);

    let candidates = detect_grids(&extract_lines(&ops, config.line_tolerance), &config);
    assert!(candidates.len() > 1);

    let regions = merge_candidates(&candidates);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].row_count, 4);
    assert_eq!(regions[0].col_count, 4);
    assert_eq!(regions[0].merged_candidates, candidates.len());
}

#[test]
fn test_scenario_d_single_horizontal_rule() {
    let mut ops = vec![PathOp::MoveTo { x: 0.0, y: 0.0 }, PathOp::LineTo { x: 400.0, y: 0.0 }];
    for x in [0.0, 100.0, 200.0, 300.0, 400.0] {
        ops.push(PathOp::MoveTo { x, y: 0.0 });
        ops.push(PathOp::LineTo { x, y: 50.0 });
    }

    let tables = extract_page_tables(&page(ops, vec![TextRun::new("x", 10.0, 10.0)]), &DetectionConfig::default());
    assert!(tables.is_empty());
}

#[test]
fn test_scenario_e_diagonal_contributes_nothing() {
    let config = DetectionConfig::default();
    let mut ops = ruled_grid(&[0.0, 30.0, 60.0], &[0.0, 50.0, 100.0]);
    ops.push(PathOp::MoveTo { x: 0.0, y: 0.0 });
    ops.push(PathOp::LineTo { x: 100.0, y: 60.0 });

    let lines = extract_lines(&ops, config.line_tolerance);
    assert_eq!(lines.horizontal.len(), 3);
    assert_eq!(lines.vertical.len(), 3);

    let tables = extract_page_tables(&page(ops, Vec::new()), &config);
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].row_count(), 3);
}

#[test]
fn test_any_regular_run_reports_its_line_counts() {
    let config = DetectionConfig::default();
    for n in 2..6 {
        for m in 2..6 {
            let ys: Vec<f64> = (0..n).map(|i| i as f64 * 20.0).collect();
            let xs: Vec<f64> = (0..m).map(|i| i as f64 * 45.0).collect();
            let ops = ruled_grid(&ys, &xs);
            let candidates = detect_grids(&extract_lines(&ops, config.line_tolerance), &config);
            assert_eq!((candidates[0].row_count, candidates[0].col_count), (n, m));
        }
    }
}

#[test]
fn test_inner_rules_short_of_the_border() {
    let mut ops = Vec::new();
    for y in [0.0, 30.0, 60.0] {
        ops.push(PathOp::MoveTo { x: 0.0, y });
        ops.push(PathOp::LineTo { x: 100.0, y });
    }
    for x in [0.0, 50.0, 100.0] {
        ops.push(PathOp::MoveTo { x, y: 2.0 });
        ops.push(PathOp::LineTo { x, y: 58.0 });
    }

    let tables = extract_page_tables(
        &page(ops, vec![TextRun::new("Qty", 60.0, 5.0)]),
        &DetectionConfig::default(),
    );
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 60.0));
    assert_eq!(tables[0].header_row, vec!["", "Qty", ""]);
}

#[test]
fn test_count_stops_at_first_spacing_violation() {
    let config = DetectionConfig::default();
    // Fourth gap of 150 is beyond max_row_gap
    let ys = [0.0, 20.0, 40.0, 60.0, 210.0, 230.0];
    let mut ops = Vec::new();
    for &y in &ys {
        ops.push(PathOp::MoveTo { x: 0.0, y });
        ops.push(PathOp::LineTo { x: 100.0, y });
    }
    for x in [0.0, 50.0, 100.0] {
        ops.push(PathOp::MoveTo { x, y: 0.0 });
        ops.push(PathOp::LineTo { x, y: 230.0 });
    }

    let candidates = detect_grids(&extract_lines(&ops, config.line_tolerance), &config);
    assert_eq!(candidates[0].row_count, 4);
    assert_eq!(candidates[0].bounding_box.bottom, 60.0);
}

#[test]
fn test_text_outside_region_never_appears() {
    let ops = ruled_grid(&[100.0, 130.0, 160.0], &[100.0, 150.0, 200.0]);
    let runs = vec![
        TextRun::new("inside", 120.0, 110.0),
        TextRun::new("above", 120.0, 90.0),
        TextRun::new("right", 250.0, 120.0),
        TextRun::new("page footer", 100.0, 700.0),
    ];

    let tables = extract_page_tables(&page(ops, runs), &DetectionConfig::default());
    let all_text: Vec<&String> = tables[0].rows().flatten().collect();
    assert!(all_text.iter().any(|t| t.as_str() == "inside"));
    assert!(all_text.iter().all(|t| !["above", "right", "page footer"].contains(&t.as_str())));
}

#[test]
fn test_identical_input_identical_output() {
    let ops = ruled_grid(&[0.0, 30.0, 60.0], &[0.0, 50.0, 100.0]);
    let content = page(ops, vec![TextRun::new("a", 10.0, 40.0)]);
    let config = DetectionConfig::default();
    assert_eq!(extract_page_tables(&content, &config), extract_page_tables(&content, &config));
}

#[test]
fn test_page_dump_fixture() {
    let json = std::fs::read_to_string("tests/fixtures/invoice_page.json").unwrap();
    let dump: Vec<PageDump> = serde_json::from_str(&json).unwrap();
    let pages = dump.into_iter().map(|p| Ok(PageContent::from(p))).collect();

    let result = extract_document_tables(pages, &TableConfig::default());
    assert_eq!(result.summary.total_tables, 1);

    let table = &result.tables[0];
    assert_eq!(table.page_number, 2);
    assert_eq!(table.header_row, vec!["Item", "Qty", "Price"]);
    assert_eq!(table.data_rows, vec![vec!["Widget", "4", "9.50"], vec!["Gadget large", "1", "120.00"]]);
}
