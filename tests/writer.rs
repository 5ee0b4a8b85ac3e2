mod common;

use std::{error::Error as _, io};

use chrono::{TimeZone, Utc};
use common::*;
use typed_csv::{ConversionError, Dialect, Record, TypedWriter};

fn open<R: Record>() -> TypedWriter<R, Vec<u8>> {
    init_logging();
    TypedWriter::from_writer(Vec::new())
}

fn output<R: Record>(writer: TypedWriter<R, Vec<u8>>) -> String {
    let bytes = writer
        .into_inner()
        .into_inner()
        .expect("flush buffered rows");
    String::from_utf8(bytes).expect("utf-8 output")
}

#[test]
fn write_header_uses_declaration_order() {
    let mut writer = open::<Person>();
    writer.write_header().expect("write header");
    assert_eq!(output(writer), PERSON_HEADER);
}

#[test]
fn write_record_multiple() {
    let mut writer = open::<Person>();
    writer.write_record(&john()).expect("write john");
    writer.write_record(&mary()).expect("write mary");
    writer.flush();
    assert!(writer.error().is_none());
    assert_eq!(
        output(writer),
        "John,1970-06-17,55,Fluffy;Spot,true,active,12.35,NULL\n\
         Mary,1971-07-18,66,Puffy;Rover,false,inactive,23.46,Hello\n"
    );
}

#[test]
fn write_record_time() {
    let record = TimeRecord {
        time: tokyo().with_ymd_and_hms(1970, 6, 17, 1, 2, 3).unwrap(),
        utc_time: Utc.with_ymd_and_hms(1971, 7, 17, 17, 3, 4).unwrap(),
        time_without_format: tokyo().with_ymd_and_hms(1972, 8, 19, 3, 4, 5).unwrap(),
    };
    let mut writer = open::<TimeRecord>();
    writer.write_record(&record).expect("write record");
    assert_eq!(
        output(writer),
        "1970-06-17 01:02:03,1971-07-18 02:03:04,1972-08-19T03:04:05+09:00\n"
    );
}

#[test]
fn write_record_with_unknown_zone() {
    let mut writer = open::<WrongZoneRecord>();
    let err = writer
        .write_record(&WrongZoneRecord::default())
        .expect_err("unknown zone");
    let format = err.as_format_error().expect("field format error");
    assert_eq!(format.field, "time");
    assert_eq!(
        format.source().expect("cause").to_string(),
        "unknown time zone abcdef"
    );
    assert_eq!(
        err.to_string(),
        "typed_csv: error formatting field 'time': unknown time zone abcdef"
    );
    assert_eq!(output(writer), "");
}

#[test]
fn write_record_optional() {
    let mut writer = open::<OptionalRecord>();
    writer
        .write_record(&OptionalRecord::default())
        .expect("write empty");
    writer
        .write_record(&OptionalRecord {
            without_null: Some("Hello".into()),
            empty_null: Some("World".into()),
            time: Some(tokyo().with_ymd_and_hms(1970, 6, 17, 1, 2, 3).unwrap()),
        })
        .expect("write filled");
    assert_eq!(
        output(writer),
        ",,NULL\nHello,World,1970-06-17T01:02:03+09:00\n"
    );
}

#[test]
fn write_record_slice() {
    let record = SliceRecord {
        semicolons: vec!["a".into(), "b".into(), "c".into()],
        lines: vec!["a".into(), "b".into(), "c".into()],
        characters: vec!["a".into(), "b".into(), "c".into()],
    };
    let mut writer = open::<SliceRecord>();
    writer.write_record(&record).expect("write record");
    assert_eq!(output(writer), "a;b;c,\"a\nb\nc\",abc\n");
}

#[test]
fn write_record_text_codec() {
    let mut writer = open::<StatusRecord>();
    writer
        .write_record(&StatusRecord {
            status: PersonStatus::Active,
        })
        .expect("write status");
    let err = writer
        .write_record(&StatusRecord {
            status: PersonStatus::Code(99),
        })
        .expect_err("status without text");
    let format = err.as_format_error().expect("field format error");
    assert_eq!(format.field, "person_status");
    assert_eq!(format.custom_cause::<UnknownStatus>(), Some(&UnknownStatus));
    assert_eq!(
        err.to_string(),
        "typed_csv: error formatting field 'person_status': unknown status"
    );
    assert_eq!(output(writer), "active\n");
}

#[test]
fn write_record_format() {
    let mut writer = open::<FormatRecord>();
    writer
        .write_record(&FormatRecord {
            percentage: 12.3456,
            hex: vec![1, 2, 3],
        })
        .expect("write record");
    assert_eq!(output(writer), "12.35,010203\n");
}

#[test]
fn write_record_map_is_unsupported() {
    let mut writer = open::<SliceOfMapRecord>();
    let record = SliceOfMapRecord {
        maps: vec![Default::default()],
    };
    let err = writer.write_record(&record).expect_err("maps unsupported");
    let format = err.as_format_error().expect("field format error");
    assert_eq!(format.field, "slice_of_map[0]");
    assert!(matches!(format.source, ConversionError::Unsupported(_)));

    let mut writer = open::<MapRecord>();
    let err = writer
        .write_record(&MapRecord::default())
        .expect_err("maps unsupported");
    assert_eq!(err.as_format_error().expect("field format error").field, "map");
}

#[test]
fn write_all_stops_at_first_failure() {
    let records = [
        StatusRecord {
            status: PersonStatus::Inactive,
        },
        StatusRecord {
            status: PersonStatus::Code(1),
        },
        StatusRecord {
            status: PersonStatus::Active,
        },
    ];
    let mut writer = open::<StatusRecord>();
    writer.write_header().expect("write header");
    assert!(writer.write_all(&records).is_err());
    assert_eq!(output(writer), "person_status\ninactive\n");
}

#[test]
fn flush_failure_is_remembered() {
    init_logging();
    let mut writer = TypedWriter::<Person, _>::from_writer(FailingWriter);
    writer.write_record(&john()).expect("buffered write");
    assert!(writer.error().is_none());
    writer.flush();
    let err = writer.error().expect("flush error");
    assert_eq!(err.to_string(), "write error");
    assert_eq!(err.kind(), io::ErrorKind::Other);
}

#[test]
fn dialect_controls_output() {
    let dialect = Dialect {
        delimiter: b'\t',
        quote_style: typed_csv::QuoteStyle::Always,
        terminator: typed_csv::LineTerminator::Crlf,
        ..Dialect::default()
    };
    let mut writer = TypedWriter::<SingleValue, _>::with_dialect(Vec::new(), &dialect);
    writer.write_header().expect("write header");
    writer
        .write_record(&SingleValue { value: 5 })
        .expect("write record");
    assert_eq!(output(writer), "\"value\"\r\n\"5\"\r\n");
}
