mod common;

use common::{assert_relative_eq, edge_case_lengths, generate_test_data};
use simt_core::{
    auto_engine, scalar_backend, sequential, ComputePrimitives, ExecutionEngine, ScratchPool,
};

#[test]
fn test_auto_engine_matches_feature() {
    let engine = auto_engine();

    println!("Auto engine configuration:");
    println!("  Strategy: {:?}", engine.strategy());
    println!("  Num threads: {}", engine.num_threads());

    #[cfg(feature = "parallel")]
    {
        assert!(engine.is_parallel(), "auto_engine() should be parallel with the parallel feature");

        // Groups may run on any worker, but results are still indexed by group
        let results = engine.execute_batch(4, |i| {
            std::thread::sleep(std::time::Duration::from_millis(5));
            i * 10
        });
        assert_eq!(results, vec![0, 10, 20, 30]);
    }

    #[cfg(not(feature = "parallel"))]
    {
        assert!(!engine.is_parallel());
        assert_eq!(engine.num_threads(), 1);
    }
}

#[test]
fn test_engines_agree_on_chunked_sums() {
    let backend = scalar_backend();
    for len in edge_case_lengths() {
        let data = generate_test_data(len);
        let chunk = 8;
        let chunks = len.div_ceil(chunk);

        let per_chunk = |c: usize| {
            let end = ((c + 1) * chunk).min(len);
            backend.sum(&data[c * chunk..end])
        };

        let sequential_total = sequential().map_reduce(chunks, per_chunk, || 0.0, |a, b| a + b);
        let auto_total = auto_engine().map_reduce(chunks, per_chunk, || 0.0, |a, b| a + b);

        let expected = backend.sum(data.as_slice());
        assert_relative_eq!(sequential_total, expected, epsilon = 1e-9);
        assert_relative_eq!(auto_total, expected, epsilon = 1e-9);
    }
}

#[test]
fn test_groups_own_their_scratch() {
    let engine = auto_engine();
    let pool = ScratchPool::<f64>::new(16);

    let sums = engine.execute_batch(64, |group| {
        let mut scratch = pool.checkout(128).unwrap();
        assert!(scratch.iter().all(|&x| x == 0.0), "scratch must arrive zeroed");
        scratch.fill(group as f64);
        scratch.iter().sum::<f64>()
    });

    for (group, sum) in sums.into_iter().enumerate() {
        assert_eq!(sum, 128.0 * group as f64);
    }
    let stats = pool.stats();
    assert_eq!(stats.allocations + stats.reuses, 64);
    assert!(stats.retained <= 16);
}
