use mark_flaky_tests::flaky;
use splitcsv::testing::{assert_balanced, assert_same_multiset, read_data_rows, read_first_record};
use splitcsv::{
    distribute, Dialect, Distributor, HeaderRow, Row, RowSource, Shuffle, SplitCountError,
    SplitError, SplitPlan, SplitPolicy,
};
use std::path::{Path, PathBuf};

fn rows(n: usize) -> Vec<Row> {
    (1..=n)
        .map(|i| Row::from(vec![i.to_string(), format!("v{i}")]))
        .collect()
}

fn plan(dir: &Path, n: usize, policy: SplitPolicy) -> anyhow::Result<SplitPlan> {
    let outputs: Vec<PathBuf> = (1..=n).map(|i| dir.join(format!("out{i}.csv"))).collect();
    Ok(SplitPlan::new(outputs, policy)?)
}

fn header() -> anyhow::Result<HeaderRow> {
    Ok(HeaderRow::from_fields(["id", "value"], &Dialect::default())?)
}

fn ids(path: &Path) -> anyhow::Result<Vec<String>> {
    Ok(read_data_rows(path, Dialect::default())?
        .into_iter()
        .map(|r| r[0].clone())
        .collect())
}

#[test]
fn quota_writes_equal_consecutive_chunks() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let plan = plan(tmp.path(), 3, SplitPolicy::Quota)?;
    let h = header()?;

    let counts = distribute(&rows(10), Some(&h), &plan)?;
    assert_eq!(counts, vec![3, 3, 3]);

    assert_eq!(ids(&plan.outputs()[0])?, vec!["1", "2", "3"]);
    assert_eq!(ids(&plan.outputs()[1])?, vec!["4", "5", "6"]);
    assert_eq!(ids(&plan.outputs()[2])?, vec!["7", "8", "9"]);
    Ok(())
}

#[test]
fn quota_total_is_outputs_times_floor() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    for (total, n) in [(100, 3), (100, 7), (17, 2), (9, 9)] {
        let plan = plan(tmp.path(), n, SplitPolicy::Quota)?;
        let counts = distribute(&rows(total), None, &plan)?;
        assert_eq!(counts.iter().sum::<usize>(), n * (total / n));
        assert!(counts.iter().all(|&c| c == total / n));
    }
    Ok(())
}

#[test]
fn quota_fails_before_writing_when_rows_are_too_few() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let plan = plan(tmp.path(), 4, SplitPolicy::Quota)?;

    let err = distribute(&rows(3), None, &plan).unwrap_err();
    assert!(matches!(
        err,
        SplitError::InvalidSplitCount(SplitCountError::InsufficientRows { rows: 3, outputs: 4 })
    ));
    assert!(plan.outputs().iter().all(|p| !p.exists()));
    Ok(())
}

#[test]
fn quota_uses_supplied_row_count() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let plan = plan(tmp.path(), 2, SplitPolicy::Quota)?;

    // Claiming 4 rows out of 10 gives a quota of 2.
    let counts = Distributor::default()
        .with_row_count(4)
        .distribute(&rows(10), None, &plan)?;
    assert_eq!(counts, vec![2, 2]);
    Ok(())
}

#[test]
fn round_robin_keeps_every_row() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let plan = plan(tmp.path(), 3, SplitPolicy::RoundRobin)?;
    let h = header()?;

    let counts = distribute(&rows(10), Some(&h), &plan)?;
    assert_eq!(counts, vec![4, 3, 3]);
    assert_balanced(&counts);

    assert_eq!(ids(&plan.outputs()[0])?, vec!["1", "4", "7", "10"]);
    assert_eq!(ids(&plan.outputs()[1])?, vec!["2", "5", "8"]);
    assert_eq!(ids(&plan.outputs()[2])?, vec!["3", "6", "9"]);
    Ok(())
}

#[test]
fn round_robin_allows_fewer_rows_than_outputs() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let plan = plan(tmp.path(), 4, SplitPolicy::RoundRobin)?;
    let h = header()?;

    let counts = distribute(&rows(2), Some(&h), &plan)?;
    assert_eq!(counts, vec![1, 1, 0, 0]);
    // Empty outputs still carry the header.
    assert_eq!(read_first_record(&plan.outputs()[3], Dialect::default())?, b"id,value\n");
    Ok(())
}

#[test]
fn header_is_first_line_of_every_output() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let plan = plan(tmp.path(), 2, SplitPolicy::Quota)?;
    let h = header()?;

    distribute(&rows(4), Some(&h), &plan)?;
    for out in plan.outputs() {
        assert_eq!(read_first_record(out, Dialect::default())?, h.raw());
    }
    Ok(())
}

#[test]
fn no_header_means_data_only() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let plan = plan(tmp.path(), 2, SplitPolicy::Quota)?;

    distribute(&rows(4), None, &plan)?;
    let contents = std::fs::read_to_string(&plan.outputs()[0])?;
    assert_eq!(contents, "1,v1\n2,v2\n");
    Ok(())
}

#[test]
fn shuffle_preserves_the_row_multiset() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    for policy in [SplitPolicy::Quota, SplitPolicy::RoundRobin] {
        let plan = plan(tmp.path(), 4, policy)?;
        Distributor::default()
            .shuffle(Shuffle::Random)
            .distribute(&rows(40), Some(&header()?), &plan)?;

        let mut written = Vec::new();
        for out in plan.outputs() {
            written.extend(ids(out)?);
        }
        let expected: Vec<String> = (1..=40).map(|i| i.to_string()).collect();
        assert_same_multiset(&written, &expected);
    }
    Ok(())
}

#[test]
fn seeded_shuffle_is_reproducible() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    std::fs::create_dir_all(tmp.path().join("a"))?;
    std::fs::create_dir_all(tmp.path().join("b"))?;
    let a = plan(&tmp.path().join("a"), 2, SplitPolicy::Quota)?;
    let b = plan(&tmp.path().join("b"), 2, SplitPolicy::Quota)?;
    let h = header()?;

    let d = Distributor::default().shuffle(Shuffle::Seeded(7));
    d.distribute(&rows(50), Some(&h), &a)?;
    d.distribute(&rows(50), Some(&h), &b)?;
    for (x, y) in a.outputs().iter().zip(b.outputs()) {
        assert_eq!(ids(x)?, ids(y)?);
    }
    Ok(())
}

#[flaky]
#[test]
fn shuffle_changes_row_order() {
    let tmp = tempfile::tempdir().unwrap();
    let plan = plan(tmp.path(), 2, SplitPolicy::RoundRobin).unwrap();
    Distributor::default()
        .shuffle(Shuffle::Random)
        .distribute(&rows(60), Some(&header().unwrap()), &plan)
        .unwrap();

    let original: Vec<String> = (1..=60).step_by(2).map(|i| i.to_string()).collect();
    assert_ne!(ids(&plan.outputs()[0]).unwrap(), original);
}

#[test]
fn write_failure_is_propagated() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let outputs = vec![
        tmp.path().join("ok.csv"),
        tmp.path().join("missing").join("nope.csv"),
    ];
    let plan = SplitPlan::new(outputs, SplitPolicy::Quota)?;

    let err = distribute(&rows(4), Some(&header()?), &plan).unwrap_err();
    assert!(matches!(err, SplitError::Io { .. }));
    // Outputs finished before the failure are left in place.
    assert_eq!(ids(&plan.outputs()[0])?, vec!["1", "2"]);
    Ok(())
}

#[test]
fn row_source_counts_vec_and_slice() -> anyhow::Result<()> {
    let v = rows(5);
    assert_eq!(v.row_count()?, 5);
    assert_eq!(v[..2].row_count()?, 2);
    assert_eq!(v.rows()?.count(), 5);
    Ok(())
}
