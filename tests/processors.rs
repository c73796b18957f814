use restock_recon::{
    ReconcileError,
    data::{CellValue, Row},
    mapping::MappingSpec,
    processors::{
        DisplayFormat, FillColor, ProcessedCell, buy_box_color, classify_buy_box, days_on_hand,
        number_style, process_row,
    },
};

fn days(row: &Row) -> ProcessedCell {
    days_on_hand(row, "Days on Hand", &CellValue::Empty).expect("days on hand")
}

fn prices(min: &str, buy_box: &str, max: &str) -> Row {
    Row::from_pairs([
        ("MIN_PRICE", min),
        ("BUY_BOX_PRICE", buy_box),
        ("MAX_PRICE", max),
    ])
}

#[test]
fn days_on_hand_scales_thirty_day_velocity() {
    let row = Row::from_pairs([("Total Units", "100"), ("Units Sold Last 30 Days", "10")]);
    let cell = days(&row);
    assert_eq!(cell.value, CellValue::Number(300.0));
    assert_eq!(cell.display_format, Some(DisplayFormat::TwoDecimals));
}

#[test]
fn days_on_hand_treats_zero_stock_and_zero_sales_as_one_day() {
    let row = Row::from_pairs([("Total Units", "0"), ("Units Sold Last 30 Days", "0")]);
    assert_eq!(days(&row).value, CellValue::Number(1.0));
}

#[test]
fn days_on_hand_with_no_sales_is_infinity() {
    let row = Row::from_pairs([("Total Units", "1"), ("Units Sold Last 30 Days", "0")]);
    let cell = days(&row);
    assert_eq!(cell.value, CellValue::Text("Infinity".into()));
    assert_eq!(cell.display_format, Some(DisplayFormat::TwoDecimals));
}

#[test]
fn days_on_hand_missing_inputs_give_empty() {
    for row in [
        Row::from_pairs([("Units Sold Last 30 Days", "1")]),
        Row::from_pairs([("Total Units", "1")]),
        Row::from_pairs(Vec::<(&str, &str)>::new()),
        Row::from_pairs([("Total Units", ""), ("Units Sold Last 30 Days", "3")]),
    ] {
        let cell = days(&row);
        assert_eq!(cell.value, CellValue::Empty);
        assert_eq!(cell.display_format, Some(DisplayFormat::TwoDecimals));
    }
}

#[test]
fn days_on_hand_reads_numeric_cells_and_loose_labels() {
    let row = Row::from_pairs([
        (" total units", CellValue::Number(45.0)),
        ("UNITS SOLD LAST 30 DAYS\u{a0}", CellValue::Number(9.0)),
    ]);
    assert_eq!(days(&row).value, CellValue::Number(150.0));
}

#[test]
fn days_on_hand_rejects_non_numeric_total() {
    let row = Row::from_pairs([("Total Units", "abc"), ("Units Sold Last 30 Days", "3")]);
    let err = days_on_hand(&row, "Days on Hand", &CellValue::Empty).expect_err("parse");
    assert!(matches!(
        err,
        ReconcileError::NumericParse { ref column, ref value } if column == "Total Units" && value == "abc"
    ));
}

#[test]
fn classify_buy_box_bands() {
    assert_eq!(classify_buy_box(10.0, 15.0, 20.0), FillColor::Green);
    assert_eq!(classify_buy_box(10.0, 5.0, 20.0), FillColor::Red);
    assert_eq!(classify_buy_box(10.0, 10.0, 20.0), FillColor::Red);
    assert_eq!(classify_buy_box(10.0, 25.0, 20.0), FillColor::Orange);
    assert_eq!(classify_buy_box(10.0, 20.0, 20.0), FillColor::Orange);
}

#[test]
fn buy_box_color_fills_and_formats() {
    let current = CellValue::Text("15".into());
    let cell = buy_box_color(&prices("10", "15", "20"), "BUY_BOX_PRICE", &current).unwrap();
    assert_eq!(cell.fill, Some(FillColor::Green));
    assert_eq!(cell.display_format, Some(DisplayFormat::TwoDecimals));
    assert_eq!(cell.value, current);

    let red = buy_box_color(&prices("10", "5", "20"), "BUY_BOX_PRICE", &current).unwrap();
    assert_eq!(red.fill, Some(FillColor::Red));
    let orange = buy_box_color(&prices("10", "25", "20"), "BUY_BOX_PRICE", &current).unwrap();
    assert_eq!(orange.fill, Some(FillColor::Orange));
}

#[test]
fn buy_box_color_leaves_cell_untouched_when_a_price_is_missing() {
    let current = CellValue::Text("15".into());
    let cell = buy_box_color(&prices("10", "15", ""), "BUY_BOX_PRICE", &current).unwrap();
    assert_eq!(cell, ProcessedCell::plain(current.clone()));

    let row = Row::from_pairs([("MIN_PRICE", "10"), ("BUY_BOX_PRICE", "15")]);
    let cell = buy_box_color(&row, "BUY_BOX_PRICE", &current).unwrap();
    assert_eq!(cell.fill, None);
    assert_eq!(cell.display_format, None);
}

#[test]
fn fill_palette_matches_report_colors() {
    assert_eq!(FillColor::Green.rgb(), 0x00FF00);
    assert_eq!(FillColor::Red.rgb(), 0xFF0000);
    assert_eq!(FillColor::Orange.rgb(), 0xFFA500);
}

#[test]
fn number_style_coerces_truthy_values() {
    let row = Row::from_pairs(Vec::<(&str, &str)>::new());
    let cell = number_style(&row, "COST", &CellValue::Text(" 4.5 ".into())).unwrap();
    assert_eq!(cell.value, CellValue::Number(4.5));
    assert_eq!(cell.display_format, Some(DisplayFormat::TwoDecimals));

    let zero = number_style(&row, "COST", &CellValue::Text("0".into())).unwrap();
    assert_eq!(zero.value, CellValue::Number(0.0));
}

#[test]
fn number_style_formats_empty_without_coercion() {
    let row = Row::from_pairs(Vec::<(&str, &str)>::new());
    let cell = number_style(&row, "COST", &CellValue::Empty).unwrap();
    assert_eq!(cell, ProcessedCell::two_decimals(CellValue::Empty));
}

#[test]
fn number_style_rejects_non_numeric_text() {
    let row = Row::from_pairs(Vec::<(&str, &str)>::new());
    assert!(number_style(&row, "COST", &CellValue::Text("n/a".into())).is_err());
}

#[test]
fn process_row_runs_every_processor_on_the_merged_snapshot() {
    let spec = MappingSpec::standard();
    let mut merged = Row::new(
        spec.headers().into(),
        vec![CellValue::Empty; spec.len()],
    );
    for (label, value) in [
        ("Merchant SKU", "AB-100"),
        ("Units Sold Last 30 Days", "10"),
        ("Total Units", "100"),
        ("MIN_PRICE", "10"),
        ("BUY_BOX_PRICE", "15"),
        ("MAX_PRICE", "20"),
    ] {
        assert!(merged.set(label, CellValue::text(value)));
    }

    let processed = process_row("ab-100", &merged, &spec).unwrap();
    assert_eq!(processed.cells.len(), spec.len());
    let cell = |name: &str| {
        let idx = spec.headers().iter().position(|h| h == name).unwrap();
        processed.cells[idx].clone()
    };
    assert_eq!(cell("Merchant SKU"), ProcessedCell::plain(CellValue::Text("AB-100".into())));
    assert_eq!(cell("Total Units").value, CellValue::Number(100.0));
    assert_eq!(cell("Days on Hand").value, CellValue::Number(300.0));
    assert_eq!(cell("BUY_BOX_PRICE").fill, Some(FillColor::Green));
    assert_eq!(cell("COST"), ProcessedCell::two_decimals(CellValue::Empty));

    let rendered = processed.display_values();
    assert_eq!(rendered[0], "AB-100");
    assert_eq!(rendered[8], "100.00");
    assert_eq!(rendered[9], "300.00");
    assert_eq!(rendered[14], "15");
}
