use std::sync::Arc;

use backrank::*;
use once_cell::sync::Lazy;

static CONTEXT: Lazy<Arc<Context>> = Lazy::new(|| Context::new().unwrap());

#[test]
fn test_group_by() -> Result<()> {
    let sc = CONTEXT.clone();
    let vec = vec![
        ("x".to_string(), 1),
        ("x".to_string(), 2),
        ("x".to_string(), 3),
        ("x".to_string(), 4),
        ("x".to_string(), 5),
        ("x".to_string(), 6),
        ("x".to_string(), 7),
        ("y".to_string(), 1),
        ("y".to_string(), 2),
        ("y".to_string(), 3),
        ("y".to_string(), 4),
        ("y".to_string(), 5),
        ("y".to_string(), 6),
        ("y".to_string(), 7),
        ("y".to_string(), 8),
    ];
    let r = sc.make_rdd(vec, 4);
    let g = r.group_by_key(4);
    let mut res = g.collect()?;
    res.sort();
    let res: Vec<(String, Vec<i32>)> = res
        .into_iter()
        .map(|(k, mut v)| {
            v.sort();
            (k, v)
        })
        .collect();
    let expected = vec![
        ("x".to_string(), vec![1, 2, 3, 4, 5, 6, 7]),
        ("y".to_string(), vec![1, 2, 3, 4, 5, 6, 7, 8]),
    ];
    assert_eq!(expected, res);
    Ok(())
}

#[test]
fn test_reduce_by_key() -> Result<()> {
    let sc = CONTEXT.clone();
    let words = sc.make_rdd(
        "a b a c b a".split(' ').map(|w| w.to_string()).collect::<Vec<_>>(),
        3,
    );
    let mut counts = words
        .map(|w: String| (w, 1u32))
        .reduce_by_key(|a: u32, b: u32| a + b, 2)
        .collect()?;
    counts.sort();
    assert_eq!(
        counts,
        vec![
            ("a".to_string(), 3),
            ("b".to_string(), 2),
            ("c".to_string(), 1)
        ]
    );
    Ok(())
}

#[test]
fn test_reduce_by_key_keeps_one_record_per_key() -> Result<()> {
    let sc = CONTEXT.clone();
    let pairs = sc.make_rdd((0..1000u64).map(|i| (i % 17, i)).collect::<Vec<_>>(), 8);
    let reduced = pairs.reduce_by_key(|a: u64, b: u64| a.max(b), 5);
    assert_eq!(reduced.number_of_splits(), 5);
    assert_eq!(reduced.count()?, 17);
    let mut maxima = reduced.collect()?;
    maxima.sort();
    assert_eq!(maxima[0], (0, 986));
    assert_eq!(maxima[13], (13, 999));
    assert_eq!(maxima[16], (16, 985));
    Ok(())
}

#[test]
fn test_map_values() -> Result<()> {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(vec![(1u8, 2.0f64), (2, 4.5)], 2);
    let res = rdd.map_values(|v: f64| v * 2.0).collect()?;
    assert_eq!(res, vec![(1, 4.0), (2, 9.0)]);
    Ok(())
}

#[test]
fn test_sort_by_key() -> Result<()> {
    let sc = CONTEXT.clone();
    let data: Vec<(f64, u32)> = (0..200u32)
        .map(|i| (((i * 37) % 200) as f64 / 10.0, i))
        .collect();
    let rdd = sc.make_rdd(data, 6);

    let ascending = rdd.sort_by_key(true, 4)?.collect()?;
    assert_eq!(ascending.len(), 200);
    assert!(ascending.windows(2).all(|w| w[0].0 <= w[1].0));

    let descending = rdd.sort_by_key(false, 4)?.collect()?;
    assert_eq!(descending.len(), 200);
    assert!(descending.windows(2).all(|w| w[0].0 >= w[1].0));
    assert_eq!(descending[0].0, 19.9);
    Ok(())
}

#[test]
fn test_sort_by_key_with_duplicates_and_one_partition() -> Result<()> {
    let sc = CONTEXT.clone();
    let rdd = sc.make_rdd(vec![(2u8, 'a'), (1, 'b'), (2, 'c'), (0, 'd')], 2);
    let sorted = rdd.sort_by_key(true, 1)?.collect()?;
    let keys: Vec<u8> = sorted.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![0, 1, 2, 2]);
    Ok(())
}

#[test]
fn test_shuffle_chain() -> Result<()> {
    let sc = CONTEXT.clone();
    // two shuffles in one lineage: count per key, then group the keys by count
    let rdd = sc.make_rdd(vec![1u32, 1, 2, 3, 3, 3, 4], 3);
    let mut by_count = rdd
        .map(|x: u32| (x, 1u32))
        .reduce_by_key(|a: u32, b: u32| a + b, 2)
        .map(|(k, c): (u32, u32)| (c, k))
        .group_by_key(2)
        .map(|(c, mut ks): (u32, Vec<u32>)| {
            ks.sort();
            (c, ks)
        })
        .collect()?;
    by_count.sort();
    assert_eq!(by_count, vec![(1, vec![2, 4]), (2, vec![1]), (3, vec![3])]);
    Ok(())
}
