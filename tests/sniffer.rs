use splitcsv::{HeaderMode, LineTerminator, SplitError, Sniffer};
use std::io::{Cursor, Read, Seek, SeekFrom};

#[test]
fn sniffs_comma_with_header() -> anyhow::Result<()> {
    let d = Sniffer::new().sniff_bytes(b"id,name,score\n1,alice,2.5\n2,bob,3.0\n3,carol,1.0\n")?;
    assert_eq!(d.delimiter, b',');
    assert_eq!(d.quote, b'"');
    assert!(d.has_header);
    assert_eq!(d.terminator, LineTerminator::Lf);
    Ok(())
}

#[test]
fn sniffs_tab_and_semicolon() -> anyhow::Result<()> {
    let tab = Sniffer::new().sniff_bytes(b"a\tb\n1\t2\n3\t4\n")?;
    assert_eq!(tab.delimiter, b'\t');

    let semi = Sniffer::new().sniff_bytes(b"a;b;c\n1;2;3\n")?;
    assert_eq!(semi.delimiter, b';');
    Ok(())
}

#[test]
fn comma_is_preferred_when_several_delimiters_are_consistent() -> anyhow::Result<()> {
    // Both ',' and ';' occur once per line.
    let d = Sniffer::new().sniff_bytes(b"a,b;c\n1,2;3\n4,5;6\n")?;
    assert_eq!(d.delimiter, b',');
    Ok(())
}

#[test]
fn inconsistent_candidate_is_skipped() -> anyhow::Result<()> {
    // ',' varies per line, '|' does not.
    let d = Sniffer::new().sniff_bytes(b"a|b,c\n1|2\n3,3,3|4\n")?;
    assert_eq!(d.delimiter, b'|');
    Ok(())
}

#[test]
fn delimiters_inside_quotes_do_not_count() -> anyhow::Result<()> {
    let d = Sniffer::new().sniff_bytes(b"name;note\n\"a\";\"x,y,z\"\n\"b\";\"w\"\n")?;
    assert_eq!(d.delimiter, b';');
    assert_eq!(d.quote, b'"');
    Ok(())
}

#[test]
fn single_quote_is_detected() -> anyhow::Result<()> {
    let d = Sniffer::new().sniff_bytes(b"'k','v'\n'a','1'\n'b','2'\n")?;
    assert_eq!(d.quote, b'\'');
    assert_eq!(d.delimiter, b',');
    Ok(())
}

#[test]
fn leading_apostrophes_keep_double_quote() -> anyhow::Result<()> {
    let d = Sniffer::new().sniff_bytes(b"id,era\n1,'90s\n2,modern\n3,'80s\n4,retro\n")?;
    assert_eq!(d.quote, b'"');
    assert_eq!(d.delimiter, b',');
    assert!(d.has_header);
    Ok(())
}

#[test]
fn no_consistent_delimiter_is_ambiguous() {
    let err = Sniffer::new()
        .sniff_bytes(b"just one column\nanother line\n")
        .unwrap_err();
    assert!(matches!(err, SplitError::AmbiguousDialect(_)));

    let err = Sniffer::new().sniff_bytes(b"a,b\n1,2,3\n").unwrap_err();
    assert!(matches!(err, SplitError::AmbiguousDialect(_)));
}

#[test]
fn empty_sample_is_ambiguous() {
    let err = Sniffer::new().sniff_bytes(b"").unwrap_err();
    assert!(matches!(err, SplitError::AmbiguousDialect(_)));
}

#[test]
fn numeric_first_row_is_not_a_header() -> anyhow::Result<()> {
    let d = Sniffer::new().sniff_bytes(b"1,2.5,2024-01-01\n2,3.5,2024-01-02\n3,4.5,2024-01-03\n")?;
    assert!(!d.has_header);
    Ok(())
}

#[test]
fn fixed_width_text_column_detects_header() -> anyhow::Result<()> {
    let d = Sniffer::new().sniff_bytes(b"code,flag\nAB,yes\nCD,no\nEF,yes\n")?;
    assert!(d.has_header);
    Ok(())
}

#[test]
fn header_mode_overrides_detection() -> anyhow::Result<()> {
    let data = b"1,2\n3,4\n5,6\n";
    assert!(!Sniffer::new().sniff_bytes(data)?.has_header);
    assert!(Sniffer::new().header_mode(HeaderMode::Present).sniff_bytes(data)?.has_header);

    let text = b"id,name\n1,a\n";
    assert!(!Sniffer::new().header_mode(HeaderMode::Absent).sniff_bytes(text)?.has_header);
    Ok(())
}

#[test]
fn crlf_terminator_is_recorded() -> anyhow::Result<()> {
    let d = Sniffer::new().sniff_bytes(b"id,v\r\n1,2\r\n3,4\r\n")?;
    assert_eq!(d.terminator, LineTerminator::CrLf);
    assert_eq!(d.delimiter, b',');
    Ok(())
}

#[test]
fn sample_is_limited_to_leading_records() -> anyhow::Result<()> {
    // The 4th line breaks consistency but lies outside a 3-record sample.
    let data = b"a,b\n1,2\n3,4\n5;6;7\n";
    let d = Sniffer::new().sample_lines(3).sniff_bytes(data)?;
    assert_eq!(d.delimiter, b',');
    assert!(Sniffer::new().sniff_bytes(data).is_err());
    Ok(())
}

#[test]
fn sniff_reader_restores_position() -> anyhow::Result<()> {
    let mut cur = Cursor::new(b"skip\nid,name\n1,a\n2,b\n".to_vec());
    cur.seek(SeekFrom::Start(5))?;

    let d = Sniffer::new().sniff_reader(&mut cur)?;
    assert_eq!(d.delimiter, b',');
    assert_eq!(cur.position(), 5);

    let mut rest = String::new();
    cur.read_to_string(&mut rest)?;
    assert!(rest.starts_with("id,name"));
    Ok(())
}

#[test]
fn sniff_path_reads_files() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = splitcsv::testing::write_numbered_csv(tmp.path(), "n.csv", 30)?;
    let d = Sniffer::new().sniff_path(&path)?;
    assert_eq!(d.delimiter, b',');
    assert!(d.has_header);
    Ok(())
}
