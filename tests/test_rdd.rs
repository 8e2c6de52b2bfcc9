use std::sync::Arc;

use backrank::*;
use once_cell::sync::Lazy;

static CONTEXT: Lazy<Arc<Context>> = Lazy::new(|| Context::new().unwrap());

#[test]
fn test_make_rdd() -> Result<()> {
    let sc = CONTEXT.clone();
    let col = sc.make_rdd((0..10).collect::<Vec<_>>(), 32);
    let vec_iter = col.map(|i: i32| (0..i).collect::<Vec<_>>());
    let res = vec_iter.collect()?;
    let expected = (0..10)
        .map(|i| (0..i).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    assert_eq!(expected, res);
    Ok(())
}

#[test]
fn test_map_partitions() -> Result<()> {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(vec![1i64, 2, 3, 4], 2);
    let partition_sums = rdd
        .map_partitions(|index: usize, iter: Box<dyn Iterator<Item = i64>>| {
            Box::new(std::iter::once((index, iter.sum::<i64>())))
                as Box<dyn Iterator<Item = (usize, i64)>>
        })
        .collect()?;
    assert_eq!(partition_sums, vec![(0, 3), (1, 7)]);
    Ok(())
}

#[test]
fn test_flat_map() -> Result<()> {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(vec![1u32, 2, 3], 3);
    let res = rdd
        .flat_map(|n: u32| Box::new(std::iter::repeat(n).take(n as usize)) as Box<dyn Iterator<Item = u32>>)
        .collect()?;
    assert_eq!(res, vec![1, 2, 2, 3, 3, 3]);
    Ok(())
}

#[test]
fn test_count() -> Result<()> {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(0..1000u64, 7);
    assert_eq!(rdd.count()?, 1000);
    let empty = sc.make_rdd(Vec::<u64>::new(), 4);
    assert_eq!(empty.count()?, 0);
    assert!(empty.collect()?.is_empty());
    Ok(())
}

#[test]
fn test_reduce() -> Result<()> {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(1..=100i64, 8);
    assert_eq!(rdd.reduce(|a: i64, b: i64| a + b)?, Some(5050));
    let empty = sc.make_rdd(Vec::<i64>::new(), 3);
    assert_eq!(empty.reduce(|a: i64, b: i64| a + b)?, None);
    Ok(())
}

#[test]
fn test_take() -> Result<()> {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(0..100u32, 10);
    assert_eq!(rdd.take(0)?, Vec::<u32>::new());
    assert_eq!(rdd.take(3)?, vec![0, 1, 2]);
    assert_eq!(rdd.take(25)?, (0..25).collect::<Vec<_>>());
    assert_eq!(rdd.take(1000)?.len(), 100);

    // the leading partitions hold nothing, so take has to scale up
    let sparse = sc.make_rdd(vec![7u8], 16);
    assert_eq!(sparse.take(1)?, vec![7]);
    Ok(())
}

#[test]
fn test_lineage_is_reused() -> Result<()> {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(0..20i32, 4).map(|x: i32| x * 2);
    let first = rdd.collect()?;
    let second = rdd.collect()?;
    assert_eq!(first, second);
    assert_eq!(first[19], 38);
    Ok(())
}

#[test]
fn test_run_job_with_context() -> Result<()> {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(0..6u8, 3);
    let splits = sc.run_job_with_context(
        rdd,
        |(task_context, iter): (TaskContext, Box<dyn Iterator<Item = u8>>)| {
            (task_context.split_id, iter.count())
        },
    )?;
    assert_eq!(splits, vec![(0, 2), (1, 2), (2, 2)]);
    Ok(())
}

#[test]
fn test_task_panic_fails_the_job() {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(0..10i32, 2).map(|x: i32| {
        if x == 7 {
            panic!("bad record {}", x);
        }
        x
    });
    match rdd.collect() {
        Err(Error::TaskFailed {
            partition, reason, ..
        }) => {
            assert_eq!(partition, 1);
            assert!(reason.contains("bad record 7"));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_separate_contexts() -> Result<()> {
    let other = Context::with_config(&Configuration::default())?;
    let rdd = other.make_rdd(vec![(1u8, 1u32), (1, 2), (2, 3)], 2);
    let mut res = rdd.reduce_by_key(|a: u32, b: u32| a + b, 2).collect()?;
    res.sort();
    assert_eq!(res, vec![(1, 3), (2, 3)]);
    Ok(())
}
