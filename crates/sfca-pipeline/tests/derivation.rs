//! End-to-end derivation against the in-memory and filesystem stores

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sfca_artifact::{CitywideMonthly, NeighborhoodCategoryMonthly, Value};
use sfca_pipeline::{
    derive_from_paths, ArtifactSet, ConsistencyChecker, DerivationRun, PipelineConfig,
    TimeSource,
};
use sfca_store::{
    to_csv_string, ArtifactReader, ArtifactStore, DisplayDefaults, FsArtifactStore, LoadError,
    MemoryArtifactStore, SessionSnapshot, StoreError,
};
use sfca_test_utils::{forecast_table, mission_january, raw_table, RawIncident};

fn jan_2024() -> Value {
    Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
}

#[test]
fn mission_january_yields_expected_views() {
    let store = MemoryArtifactStore::new();
    DerivationRun::new(PipelineConfig::default())
        .run(&mission_january(), None, &store)
        .unwrap();
    let reader = ArtifactReader::new(&store);

    let citywide = reader.load::<CitywideMonthly>().unwrap();
    assert_eq!(
        citywide.table().rows().to_vec(),
        vec![vec![jan_2024(), Value::Int(5)]]
    );

    let nbh = reader.load::<NeighborhoodCategoryMonthly>().unwrap();
    assert_eq!(
        nbh.table().rows().to_vec(),
        vec![
            vec![jan_2024(), Value::Int(2024), Value::text("Mission"), Value::text("Assault"), Value::Int(2)],
            vec![jan_2024(), Value::Int(2024), Value::text("Mission"), Value::text("Theft"), Value::Int(3)],
        ]
    );
}

#[test]
fn unparsable_timestamp_drops_exactly_one_row() {
    let mut incidents = RawIncident::at("2024-01-05 08:30:00").times(4);
    incidents.push(RawIncident::at("yesterday-ish"));
    let raw = raw_table("incident_datetime", &incidents);

    let store = MemoryArtifactStore::new();
    let report = DerivationRun::new(PipelineConfig::default())
        .run(&raw, None, &store)
        .unwrap();

    assert_eq!(report.time_source, Some(TimeSource::EventTimestamp));
    let audit = report.monthly_audit.unwrap();
    assert_eq!(audit.dropped(), 1);
    assert_eq!(audit.missing_key.get("month"), Some(&1));

    let citywide = ArtifactReader::new(&store).load::<CitywideMonthly>().unwrap();
    assert_eq!(citywide.table().sum_int("incidents"), Some(4));
}

#[test]
fn never_published_is_not_found() {
    let reader = ArtifactReader::new(MemoryArtifactStore::new());
    let err = reader.load::<CitywideMonthly>().unwrap_err();
    assert!(matches!(err, LoadError::NotFound(ref name) if name == "monthly_citywide"));

    let dir = tempfile::tempdir().unwrap();
    let store = FsArtifactStore::open(dir.path()).unwrap();
    assert!(matches!(store.get("monthly_citywide"), Err(StoreError::NotFound(_))));
}

#[test]
fn hour_filter_differs_from_monthly_filter() {
    let mut incidents = RawIncident::at("2024-01").times(3);
    incidents.push(RawIncident::at("2024-01").hour("24"));
    incidents.push(RawIncident::at("2024-01").hour("noon"));
    incidents.push(RawIncident::at("2024-01").weekday("Someday"));
    let store = MemoryArtifactStore::new();
    let report = DerivationRun::new(PipelineConfig::default())
        .run(&raw_table("year_month", &incidents), None, &store)
        .unwrap();

    let hourly = report.hourly_audit.as_ref().unwrap();
    assert_eq!(hourly.hour_out_of_range, 1);
    assert_eq!(hourly.hour_invalid, 1);
    assert_eq!(hourly.missing_key.get("weekday_label"), Some(&1));
    assert_eq!(report.monthly_audit.as_ref().unwrap().dropped(), 0);
    assert_eq!(report.rows("hourly_weekday_counts"), Some(1));
}

#[test]
fn filesystem_round_trip_and_session_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("incidents_clean.csv");
    let forecast_path = dir.path().join("forecast.csv");
    let out = dir.path().join("artifacts");

    let mut incidents = RawIncident::at("2025-11-03T10:00:00").category("Theft").times(2);
    incidents.extend(RawIncident::at("2025-12-24T22:15:00").neighborhood("Castro").times(3));
    std::fs::write(&raw_path, to_csv_string(&raw_table("incident_datetime", &incidents)).unwrap())
        .unwrap();
    let forecast = forecast_table(&[("2026-02", 6.0, 4.0, 8.0), ("2026-01", 5.0, 3.5, 7.25)]);
    std::fs::write(&forecast_path, to_csv_string(&forecast).unwrap()).unwrap();

    let config = PipelineConfig::default()
        .with_raw(&raw_path)
        .with_forecast(&forecast_path)
        .with_artifacts_dir(&out);
    let report = derive_from_paths(&config).unwrap();
    assert_eq!(report.published.len(), 4);

    let store = FsArtifactStore::open(&out).unwrap();
    let manifest = store.manifest().unwrap();
    for published in &report.published {
        let entry = manifest.get(&published.name).unwrap();
        assert_eq!(entry.content_hash, published.hash);
        assert_eq!(entry.rows, published.rows);
    }

    let snapshot = SessionSnapshot::load(&ArtifactReader::new(&store), DisplayDefaults::default());
    assert_eq!(snapshot.available_views().len(), 4);
    assert_eq!(snapshot.default_neighborhoods(), vec!["Castro", "Mission"]);
    assert!(ConsistencyChecker::new()
        .check(&ArtifactSet::from_snapshot(&snapshot))
        .is_ok());
}

#[test]
fn tampered_artifact_is_corrupted() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsArtifactStore::open(dir.path()).unwrap();
    DerivationRun::new(PipelineConfig::default())
        .run(&mission_january(), None, &store)
        .unwrap();

    std::fs::write(
        store.artifact_path("monthly_citywide"),
        "month,incidents\n2024-01-01,6\n",
    )
    .unwrap();
    let err = ArtifactReader::new(&store).load::<CitywideMonthly>().unwrap_err();
    assert!(matches!(err, LoadError::Store(StoreError::Corrupted { .. })));
}
