use verif_thresh::{SingleThresh, ThreshArray, ThreshOp};

#[test]
fn climo_percentile_bins_follow_local_climatology() {
    let ta = ThreshArray::new(vec![
        SingleThresh::climo_percentile(ThreshOp::Ge, 50.0).unwrap(),
        SingleThresh::climo_percentile(ThreshOp::Ge, 97.5).unwrap(),
    ])
    .unwrap();

    // Median is the climo mean; 97.5th percentile is mean + 1.96 sd.
    assert_eq!(ta.check_bins(9.0, Some(10.0), Some(1.0)), 0);
    assert_eq!(ta.check_bins(10.5, Some(10.0), Some(1.0)), 1);
    assert_eq!(ta.check_bins(12.5, Some(10.0), Some(1.0)), 2);
    // Same value, colder climatology.
    assert_eq!(ta.check_bins(10.5, Some(5.0), Some(1.0)), 2);
}

#[test]
fn missing_climatology_drops_to_lowest_category() {
    let ta = ThreshArray::new(vec![
        SingleThresh::climo_percentile(ThreshOp::Gt, 10.0).unwrap(),
    ])
    .unwrap();
    assert_eq!(ta.check_bins(100.0, None, None), 0);
}

#[test]
fn every_value_lands_in_exactly_one_category() {
    let ta: ThreshArray = ">0,>2.5,>10".parse().unwrap();
    let mut counts = vec![0usize; ta.n_categories()];
    for i in 0..200 {
        let v = i as f64 * 0.1 - 1.0;
        counts[ta.check_bins(v, None, None)] += 1;
    }
    assert_eq!(counts.iter().sum::<usize>(), 200);
    assert!(counts.iter().all(|&c| c > 0));
}

#[test]
fn array_serde_round_trip_through_config_string() {
    let ta: ThreshArray = serde_json::from_str("\">=1,>=5\"").unwrap();
    assert_eq!(ta.len(), 2);
    assert_eq!(serde_json::to_string(&ta).unwrap(), "\">=1,>=5\"");
}
