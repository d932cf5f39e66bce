use loglens::{aggregate_file, AnalyzeError, ColumnNames, RangeFilter, Session, ViewOptions};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// Helper to write a CSV export with the given header and body lines
fn write_csv(header: &str, lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", header).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

const HEADER: &str = "Timestamp (UTC) Seconds,Source IP,Host Name,Category,Action,Bytes";

/// Extra columns and column order don't matter; rows are mapped by header name
#[test]
fn test_aggregate_file_maps_columns_by_name() {
    let file = write_csv(
        HEADER,
        &[
            "1700000000,10.1.1.1,https://mail.example.co.uk/inbox,webmail,allow,512",
            "1700000030,10.1.1.2,http://example.co.uk,webmail,allow,128",
            "1700000100,10.1.1.1,https://news.bbc.co.uk/,news,allow,4096",
            "1700000101,10.1.1.3,172.16.0.5,infra,deny,0",
        ],
    );

    let result = aggregate_file(file.path(), &ColumnNames::default(), &RangeFilter::unbounded())
        .unwrap();

    assert_eq!(result.total_records(), 4);
    assert_eq!(
        result.top_domains(None),
        vec![("example.co.uk", 2), ("bbc.co.uk", 1), ("172.16.0.5", 1)]
    );
    assert_eq!(
        result.top_categories(None),
        vec![("webmail", 2), ("news", 1), ("infra", 1)]
    );
    assert_eq!(result.top_addresses(Some(1)), vec![("10.1.1.1", 2)]);
}

/// Quoted fields with embedded commas are read as a single value
#[test]
fn test_aggregate_file_handles_quoted_fields() {
    let file = write_csv(
        HEADER,
        &[r#"1700000000,10.1.1.1,"http://shop.example.com/a,b",retail,allow,1"#],
    );

    let result = aggregate_file(file.path(), &ColumnNames::default(), &RangeFilter::unbounded())
        .unwrap();
    assert_eq!(result.top_domains(None), vec![("example.com", 1)]);
}

/// Latin-1 bytes in a column nobody reads don't cost the row
#[test]
fn test_aggregate_file_tolerates_latin1_in_extra_columns() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"Source IP,Host Name,Category,Timestamp (UTC) Seconds,User Agent\n")
        .unwrap();
    file.write_all(b"10.0.0.1,a.example.com,ads,60,Mozilla \xe9t\xe9\n")
        .unwrap();
    file.write_all(b"10.0.0.2,a.example.com,ads,61,curl\n").unwrap();
    file.flush().unwrap();

    let result = aggregate_file(file.path(), &ColumnNames::default(), &RangeFilter::unbounded())
        .unwrap();

    assert_eq!(result.total_records(), 2);
    assert_eq!(result.top_domains(None), vec![("example.com", 2)]);
    let range = result.time_range().unwrap();
    assert_eq!(range.min.timestamp(), 60);
    assert_eq!(range.max.timestamp(), 61);
}

/// A file that doesn't exist fails the run instead of yielding an empty result
#[test]
fn test_aggregate_file_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.csv");

    let err = aggregate_file(&path, &ColumnNames::default(), &RangeFilter::unbounded())
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::Open { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

/// Header without a required column is an operation-level failure
#[test]
fn test_aggregate_file_missing_header() {
    let file = write_csv("Source IP,Host Name,Category", &["10.0.0.1,a.com,ads"]);

    let err = aggregate_file(file.path(), &ColumnNames::default(), &RangeFilter::unbounded())
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::MissingColumn(ref name) if name == "Timestamp (UTC) Seconds"));
}

/// An empty file has no header at all
#[test]
fn test_aggregate_file_empty_file() {
    let file = NamedTempFile::new().unwrap();

    let err = aggregate_file(file.path(), &ColumnNames::default(), &RangeFilter::unbounded())
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::MissingColumn(_)));
}

/// Custom header names from the command line are honored
#[test]
fn test_aggregate_file_custom_columns() {
    let file = write_csv(
        "client,url,tag,epoch",
        &["192.168.1.4,http://cdn.site.org/x.js,static,60"],
    );
    let columns = ColumnNames {
        address: "client".to_string(),
        target: "url".to_string(),
        category: "tag".to_string(),
        timestamp: "epoch".to_string(),
    };

    let result = aggregate_file(file.path(), &columns, &RangeFilter::unbounded()).unwrap();
    assert_eq!(result.top_addresses(None), vec![("192.168.1.4", 1)]);
    assert_eq!(result.top_domains(None), vec![("site.org", 1)]);
}

/// Full shell flow: load, narrow to a window, render
#[test]
fn test_session_load_filter_and_render() {
    // 2024-03-01 12:00:00 UTC onwards
    let file = write_csv(
        HEADER,
        &[
            "1709294400,10.0.0.1,www.example.com,news,allow,1",
            "1709294410,10.0.0.2,api.example.com,news,allow,1",
            "1709294470,10.0.0.1,tracker.ads.net,ads,deny,1",
            "1709380800,10.0.0.9,www.example.com,news,allow,1",
            "garbage,10.0.0.5,www.example.com,news,allow,1",
        ],
    );

    let mut session = Session::new(ColumnNames::default());
    session.load(file.path()).unwrap();

    let mut range = session.range_defaults().unwrap();
    range.end_date = range.start_date;
    let result = session.apply(&range).unwrap();
    assert_eq!(result.total_records(), 3);
    assert_eq!(result.counters().rows_skipped, 1);
    assert_eq!(result.counters().rows_filtered, 1);

    let mut out = Vec::new();
    loglens::report::write_report(&mut out, result, &ViewOptions::default()).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("Records found: 3"));
    assert!(text.contains("- example.com: 2"));
    assert!(text.contains("Peak activity: 2024-03-01 12:00 UTC (2 requests)"));
}
