use crf_analytics::counts::{
    proportions, pyramid_counts, upset_counts, PyramidColumns, UpsetVariables,
    DEFAULT_MAX_VARIABLES, DEFAULT_UPSET_VARIABLES,
};
use crf_analytics::dictionary::Dictionary;
use crf_analytics::frame::{build_descriptive_frame, DescriptiveOptions};
use crf_analytics::ingestion::{read_dictionary_csv, read_frame_csv};
use crf_analytics::selection::SelectionOptions;
use crf_analytics::types::DataSet;

fn fixtures() -> (Dictionary, DataSet, DataSet) {
    let dict = read_dictionary_csv("tests/fixtures/dictionary.csv").unwrap();
    let raw = read_frame_csv("tests/fixtures/data.csv", &dict).unwrap();
    let options = DescriptiveOptions {
        group_by: Some("outco_outcome".to_string()),
        selection: SelectionOptions::for_sections(&["demog", "comor"]),
        ..Default::default()
    };
    let frame = build_descriptive_frame(&raw, &dict, &options).unwrap();
    (dict, raw, frame)
}

#[test]
fn proportions_skip_numeric_and_text_columns() {
    let (dict, _, frame) = fixtures();
    let out = proportions(&frame, &dict, DEFAULT_MAX_VARIABLES);

    let names: Vec<&str> = out.iter().map(|p| p.variable.as_str()).collect();
    assert_eq!(
        names,
        vec!["demog_sex___Male", "comor_hiv", "demog_sex___Female", "comor_smoking___Yes"]
    );
    assert!((out[0].proportion - 4.0 / 7.0).abs() < 1e-12);
    assert_eq!(out[0].label, "<b>Sex at birth</b>, Male");
    assert_eq!(out[1].label, "<b>HIV</b>");
    assert_eq!(out[3].short_label, "<b> Smoking</b>, Yes");
}

#[test]
fn upset_counts_from_explicit_variables() {
    let (dict, _, frame) = fixtures();
    let variables = vec![
        "comor_hiv".to_string(),
        "demog_sex___Female".to_string(),
        "comor_smoking___Yes".to_string(),
    ];
    let out = upset_counts(
        &frame,
        &dict,
        UpsetVariables::Explicit(&variables),
        DEFAULT_UPSET_VARIABLES,
    )
    .unwrap();

    let counts: Vec<(&str, usize)> = out
        .counts
        .iter()
        .map(|c| (c.variable.as_str(), c.count))
        .collect();
    assert_eq!(
        counts,
        vec![("comor_hiv", 4), ("demog_sex___Female", 3), ("comor_smoking___Yes", 3)]
    );

    let intersections: Vec<(Vec<&str>, usize)> = out
        .intersections
        .iter()
        .map(|i| (i.variables.iter().map(String::as_str).collect(), i.count))
        .collect();
    assert_eq!(
        intersections,
        vec![
            (vec!["comor_hiv"], 3),
            (vec!["demog_sex___Female", "comor_smoking___Yes"], 2),
            (vec!["comor_hiv", "demog_sex___Female", "comor_smoking___Yes"], 1),
        ]
    );
    assert_eq!(
        out.intersections[1].labels,
        vec!["<b>Sex at birth</b>, Female", "<b> Smoking</b>, Yes"]
    );
}

#[test]
fn upset_counts_take_top_proportions() {
    let (dict, _, frame) = fixtures();
    let props = proportions(&frame, &dict, 10);
    let out = upset_counts(&frame, &dict, UpsetVariables::Proportions(&props), 2).unwrap();

    let names: Vec<&str> = out.counts.iter().map(|c| c.variable.as_str()).collect();
    assert_eq!(names, vec!["demog_sex___Male", "comor_hiv"]);
    let total: usize = out.intersections.iter().map(|i| i.count).sum();
    // Rows with at least one of the two hot: p02, p03, p05, p06, p08, p01.
    assert_eq!(total, 6);
}

#[test]
fn pyramid_counts_from_raw_frame() {
    let (_, raw, _) = fixtures();
    let columns = PyramidColumns {
        side: "demog_sex".to_string(),
        y_axis: "comor_smoking".to_string(),
        stack_group: "outco_outcome".to_string(),
    };
    let bars = pyramid_counts(&raw, &columns, "Female", "Male").unwrap();

    let total: usize = bars.iter().map(|b| b.value).sum();
    // p04 lacks an outcome, p06 lacks sex and smoking status.
    assert_eq!(total, 6);
    assert!(bars.windows(2).all(|w| w[0].y_axis <= w[1].y_axis));
    assert!(bars.iter().filter(|b| b.side == "Female").all(|b| b.left_side));
    assert!(bars.iter().filter(|b| b.side == "Male").all(|b| !b.left_side));
}
