#![allow(dead_code)]

use std::{
    collections::HashMap,
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use chrono::{DateTime, FixedOffset, NaiveDate};
use tempfile::{TempDir, tempdir};
use typed_csv::{Record, SchemaBuilder, TextCodec, csv_record, text_field};

static LOGGER: OnceLock<()> = OnceLock::new();

/// Installs `env_logger` once per test binary so `RUST_LOG` works in tests.
pub fn init_logging() {
    LOGGER.get_or_init(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub const PERSON_HEADER: &str = "name,birthday,age,pet names,active,status,percentage,optional\n";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersonStatus {
    #[default]
    Unknown,
    Active,
    Inactive,
    /// A status code with no textual form.
    Code(u8),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown status")]
pub struct UnknownStatus;

impl TextCodec for PersonStatus {
    type Error = UnknownStatus;

    fn from_text(text: &[u8]) -> Result<Self, Self::Error> {
        match text {
            b"unknown" => Ok(PersonStatus::Unknown),
            b"active" => Ok(PersonStatus::Active),
            b"inactive" => Ok(PersonStatus::Inactive),
            _ => Err(UnknownStatus),
        }
    }

    fn to_text(&self) -> Result<Vec<u8>, Self::Error> {
        match self {
            PersonStatus::Unknown => Ok(b"unknown".to_vec()),
            PersonStatus::Active => Ok(b"active".to_vec()),
            PersonStatus::Inactive => Ok(b"inactive".to_vec()),
            PersonStatus::Code(_) => Err(UnknownStatus),
        }
    }
}

text_field!(PersonStatus);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub name: String,
    pub birthday: NaiveDate,
    pub age: u8,
    pub pet_names: Vec<String>,
    pub active: bool,
    pub status: PersonStatus,
    pub percentage: f64,
    pub optional: Option<String>,
    pub skipped: String,
}

csv_record!(Person {
    name => "name",
    birthday => "birthday" { time_layout: "%Y-%m-%d" },
    age => "age",
    pet_names => "pet names" { separator: ";" },
    active => "active",
    status => "status",
    percentage => "percentage" { format: "%.2f" },
    optional => "optional" { null: "NULL" },
});

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn john() -> Person {
    Person {
        name: "John".into(),
        birthday: date(1970, 6, 17),
        age: 55,
        pet_names: vec!["Fluffy".into(), "Spot".into()],
        active: true,
        status: PersonStatus::Active,
        percentage: 12.3456,
        optional: None,
        skipped: String::new(),
    }
}

pub fn mary() -> Person {
    Person {
        name: "Mary".into(),
        birthday: date(1971, 7, 18),
        age: 66,
        pet_names: vec!["Puffy".into(), "Rover".into()],
        active: false,
        status: PersonStatus::Inactive,
        percentage: 23.4567,
        optional: Some("Hello".into()),
        skipped: String::new(),
    }
}

/// Offset for Asia/Tokyo, which has no daylight saving time.
pub fn tokyo() -> FixedOffset {
    FixedOffset::east_opt(9 * 60 * 60).expect("valid offset")
}

#[derive(Debug, Default, PartialEq)]
pub struct TimeRecord {
    pub time: DateTime<FixedOffset>,
    pub utc_time: DateTime<chrono::Utc>,
    pub time_without_format: DateTime<FixedOffset>,
}

csv_record!(TimeRecord {
    time => "time" { time_layout: "%Y-%m-%d %H:%M:%S", time_zone: "Asia/Tokyo" },
    utc_time => "utc_time" { time_layout: "%Y-%m-%d %H:%M:%S", time_zone: "Asia/Tokyo" },
    time_without_format => "time_without_format",
});

#[derive(Debug, Default)]
pub struct WrongZoneRecord {
    pub time: DateTime<FixedOffset>,
}

csv_record!(WrongZoneRecord {
    time => "time" { time_layout: "%Y-%m-%d %H:%M:%S", time_zone: "abcdef" },
});

#[derive(Debug, Default)]
pub struct TimeFormatRecord {
    pub with_zone: DateTime<FixedOffset>,
    pub without_zone: DateTime<FixedOffset>,
}

csv_record!(TimeFormatRecord {
    with_zone => "time_with_location" { time_layout: "%Y-%m-%d %H:%M:%S", time_zone: "Asia/Tokyo" },
    without_zone => "time_without_location" { time_layout: "%Y-%m-%d %H:%M:%S" },
});

#[derive(Debug, Default, PartialEq)]
pub struct OptionalRecord {
    pub without_null: Option<String>,
    pub empty_null: Option<String>,
    pub time: Option<DateTime<FixedOffset>>,
}

csv_record!(OptionalRecord {
    without_null => "optional_string",
    empty_null => "optional_string_with_empty_tag" { null: "" },
    time => "optional_time" { null: "NULL" },
});

#[derive(Debug, Default, PartialEq)]
pub struct SliceRecord {
    pub semicolons: Vec<String>,
    pub lines: Vec<String>,
    pub characters: Vec<String>,
}

csv_record!(SliceRecord {
    semicolons => "slice" { separator: ";" },
    lines => "slice_with_new_line" { separator: "\n" },
    characters => "slice_without_separator",
});

#[derive(Debug, Default, PartialEq)]
pub struct StatusRecord {
    pub status: PersonStatus,
}

csv_record!(StatusRecord {
    status => "person_status",
});

#[derive(Debug, Default, PartialEq)]
pub struct FormatRecord {
    pub percentage: f64,
    pub hex: Vec<u8>,
}

csv_record!(FormatRecord {
    percentage => "percentage" { format: "%.2f" },
    hex => "hex" { format: "%02x", separator: "" },
});

#[derive(Debug, Default)]
pub struct MapRecord {
    pub map: HashMap<String, String>,
}

impl Record for MapRecord {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.column("map", |r| &r.map, |r| &mut r.map);
    }
}

#[derive(Debug, Default)]
pub struct SliceOfMapRecord {
    pub maps: Vec<HashMap<String, String>>,
}

impl Record for SliceOfMapRecord {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.column("slice_of_map", |r| &r.maps, |r| &mut r.maps);
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct SingleValue {
    pub value: i32,
}

csv_record!(SingleValue {
    value => "value",
});

/// A sink that rejects every write.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("write error"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("write error"))
    }
}
