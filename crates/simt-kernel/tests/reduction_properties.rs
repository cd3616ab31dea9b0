//! End-to-end properties of the reduction

mod common;

use common::*;
use simt_core::{sequential, ExecutionEngine};
use simt_kernel::{
    check_extremum, check_sum, BlockStrategy, DeviceSlice, FinalCombine, LaunchConfig, LoadWidth,
    Max, Min, ReduceKind, Reducer, Sum,
};

#[test]
fn test_sum_matches_reference_across_lengths() {
    let reducer = Reducer::<f32>::new(LaunchConfig::new(128)).unwrap();
    for (seed, &n) in BOUNDARY_LENGTHS.iter().enumerate() {
        let data = uniform_f32(n, -1.0, 1.0, seed as u64);
        let total = reducer.reduce(&data, Sum).unwrap();
        let check = check_sum(&data, total).unwrap();
        assert!(check.passed(), "n = {n}: {check:?}");
    }
}

#[test]
fn test_extrema_match_reference_across_lengths() {
    let reducer = Reducer::<f64>::new(LaunchConfig::new(128)).unwrap();
    for &n in &BOUNDARY_LENGTHS {
        let data = uniform_f64(n, -1e6, 1e6, 7);
        let max = reducer.reduce(&data, Max).unwrap();
        let min = reducer.reduce(&data, Min).unwrap();
        assert!(check_extremum(&data, ReduceKind::Max, max).unwrap().passed(), "n = {n}");
        assert!(check_extremum(&data, ReduceKind::Min, min).unwrap().passed(), "n = {n}");
    }
}

#[test]
fn test_result_independent_of_group_size() {
    let data = uniform_f64(2048 * 7 + 3, -10.0, 10.0, 42);
    let baseline = Reducer::<f64>::new(LaunchConfig::new(GROUP_SIZES[0]))
        .unwrap()
        .reduce(&data, Sum)
        .unwrap();

    for &group_size in &GROUP_SIZES[1..] {
        let reducer = Reducer::<f64>::new(LaunchConfig::new(group_size)).unwrap();
        let total = reducer.reduce(&data, Sum).unwrap();
        assert_relative_eq!(total, baseline, epsilon = 1e-9);
        assert_eq!(reducer.reduce(&data, Max).unwrap(), data.iter().cloned().fold(f64::MIN, f64::max));
    }
}

#[test]
fn test_rerun_is_not_a_running_total() {
    let data = uniform_f32(5000, 0.0, 1.0, 3);
    let reducer = Reducer::<f32>::new(LaunchConfig::default()).unwrap();
    let first = reducer.reduce(&data, Sum).unwrap();
    for _ in 0..3 {
        assert_eq!(reducer.reduce(&data, Sum).unwrap(), first);
    }
}

#[test]
fn test_nan_padding_is_never_read() {
    let valid = uniform_f32(129, -1.0, 1.0, 11);
    let buffer = nan_padded(&valid, 127);
    let padded = DeviceSlice::new(&buffer, valid.len()).unwrap();

    for strategy in BlockStrategy::ALL {
        for load in [LoadWidth::Scalar, LoadWidth::Quad] {
            let config = LaunchConfig::new(128).with_strategy(strategy).with_load(load);
            let reducer = Reducer::<f32>::new(config).unwrap();

            let total = reducer.reduce(padded, Sum).unwrap();
            assert!(!total.is_nan(), "{strategy:?} {load:?}");
            assert!(check_sum(&valid, total).unwrap().passed(), "{strategy:?} {load:?}");

            assert!(!reducer.reduce(padded, Max).unwrap().is_nan());
            assert!(!reducer.reduce(padded, Min).unwrap().is_nan());
        }
    }
}

#[test]
fn test_four_elements_one_group() {
    let config = LaunchConfig::new(4).with_strategy(BlockStrategy::SharedTree);
    let reducer = Reducer::with_engine(config, sequential()).unwrap();
    let report = reducer
        .reduce_with_report(&[1.0f32, 2.0, 3.0, 4.0][..], Sum)
        .unwrap();

    assert_eq!(report.value, 10.0);
    assert_eq!(report.group_count, 1);
    assert_eq!(report.stats.totals.tree_rounds, 2);
}

#[test]
fn test_two_groups_partials_and_total() {
    let data = [1.0f32, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0];

    let partials = Reducer::with_engine(
        LaunchConfig::new(4).with_finalize(FinalCombine::Partials),
        sequential(),
    )
    .unwrap();
    let report = partials.reduce_with_report(&data[..], Sum).unwrap();
    assert_eq!(report.group_count, 2);
    assert_eq!(report.value, 12.0);

    // Same total whichever group's atomic combine lands first
    let atomic = Reducer::<f32>::new(LaunchConfig::new(4)).unwrap();
    for _ in 0..50 {
        assert_eq!(atomic.reduce(&data[..], Sum).unwrap(), 12.0);
    }
}

#[test]
fn test_every_strategy_load_and_finalize_agree() {
    let data = uniform_f64(3000, -5.0, 5.0, 99);
    let expected = data.iter().sum::<f64>();

    for strategy in BlockStrategy::ALL {
        for load in [LoadWidth::Scalar, LoadWidth::Quad] {
            for finalize in [FinalCombine::Atomic, FinalCombine::Partials] {
                for lane_width in [8, 32] {
                    let config = LaunchConfig::new(256)
                        .with_strategy(strategy)
                        .with_load(load)
                        .with_finalize(finalize)
                        .with_lane_width(lane_width);
                    let total = Reducer::<f64>::new(config).unwrap().reduce(&data, Sum).unwrap();
                    assert_relative_eq!(total, expected, epsilon = 1e-9);
                }
            }
        }
    }
}

#[test]
fn test_quad_load_covers_four_times_the_input_per_group() {
    let data = vec![1.0f32; 1000];
    let config = LaunchConfig::new(64).with_load(LoadWidth::Quad);
    let report = Reducer::new(config)
        .unwrap()
        .reduce_with_report(&data, Sum)
        .unwrap();
    assert_eq!(report.group_count, 4);
    assert_eq!(report.value, 1000.0);
}

#[test]
fn test_config_from_json() {
    let config: LaunchConfig = serde_json::from_str(
        r#"{ "group_size": 512, "lane_width": 16, "strategy": "warp_shuffle", "load": "quad", "finalize": "partials" }"#,
    )
    .unwrap();
    let data = uniform_f64(10_000, 0.0, 1.0, 5);
    let total = Reducer::<f64>::new(config).unwrap().reduce(&data, Sum).unwrap();
    assert!(check_sum(&data, total).unwrap().passed());
}

#[test]
fn test_engine_is_shared_across_reducers() {
    let engine = sequential();
    assert!(!engine.is_parallel());
    let a = Reducer::with_engine(LaunchConfig::new(64), engine).unwrap();
    let b = Reducer::with_engine(LaunchConfig::new(1024), engine).unwrap();
    let data = uniform_f32(4096, -1.0, 1.0, 8);
    assert_relative_eq!(
        a.reduce(&data, Sum).unwrap(),
        b.reduce(&data, Sum).unwrap(),
        epsilon = 1e-3
    );
}
