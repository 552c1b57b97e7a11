//! CSV ingest: the record reader.
//!
//! Turns the shipment CSV into a lazy sequence of typed `RawRecord`s.
//!
//! - **Header is validated up front**: a missing required column is fatal (exit code 2)
//!   and is reported before any network call is made.
//! - **Rows are validated individually**: a bad row yields a `RowError` carrying its
//!   index; the caller drops it and keeps going.
//! - Row indices are 0-based positions among the data rows, counting skipped blank rows.
//! - Values are kept byte-for-byte; only header names are trimmed (and lose a leading BOM).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{ParcelSpec, PickupKey, PostalAddress, RawRecord, ReceiverData};
use crate::error::{AppError, EXIT_INPUT, RecordError};

pub const COL_PICKUP_APARTMENT: &str = "apartment(PickUp)";
pub const COL_PICKUP_BUILDING: &str = "building(PickUp)";
pub const COL_PICKUP_STREET: &str = "street(PickUp)";
pub const COL_PICKUP_POSTCODE: &str = "postcode(PickUp)";
pub const COL_PICKUP_CITY: &str = "city(PickUp)";

pub const COL_DELIVERY_APARTMENT: &str = "apartment(Delivery)";
pub const COL_DELIVERY_BUILDING: &str = "building(Delivery)";
pub const COL_DELIVERY_STREET: &str = "street(Delivery)";
pub const COL_DELIVERY_CITY: &str = "city(Delivery)";
pub const COL_DELIVERY_STATE: &str = "state(Delivery)";
pub const COL_DELIVERY_COUNTRY: &str = "country(Delivery)";
pub const COL_DELIVERY_POSTCODE: &str = "postcode(Delivery)";

pub const COL_FULL_NAME: &str = "fullName";
pub const COL_EMAIL: &str = "email";
pub const COL_PHONE: &str = "phone";
pub const COL_NOTE: &str = "note";
pub const COL_REFERENCE_1: &str = "referenceNumber1";
pub const COL_REFERENCE_2: &str = "referenceNumber2";

pub const COL_DIMENSION_X: &str = "dimension_x";
pub const COL_DIMENSION_Y: &str = "dimension_y";
pub const COL_DIMENSION_Z: &str = "dimension_z";
pub const COL_WEIGHT: &str = "weight";
pub const COL_REQUIRES_ATTENTION: &str = "requiresAttention";

const REQUIRED_COLUMNS: &[&str] = &[
    COL_PICKUP_APARTMENT,
    COL_PICKUP_BUILDING,
    COL_PICKUP_STREET,
    COL_PICKUP_POSTCODE,
    COL_PICKUP_CITY,
    COL_DELIVERY_APARTMENT,
    COL_DELIVERY_BUILDING,
    COL_DELIVERY_STREET,
    COL_DELIVERY_CITY,
    COL_DELIVERY_STATE,
    COL_DELIVERY_COUNTRY,
    COL_DELIVERY_POSTCODE,
    COL_FULL_NAME,
    COL_EMAIL,
    COL_PHONE,
    COL_DIMENSION_X,
    COL_DIMENSION_Y,
    COL_DIMENSION_Z,
    COL_WEIGHT,
    COL_REQUIRES_ATTENTION,
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub index: usize,
    pub error: RecordError,
}

/// Lazy, front-to-back reader over the data rows of one input file.
pub struct RecordReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    header_map: HashMap<String, usize>,
    next_index: usize,
}

impl RecordReader<File> {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(
                EXIT_INPUT,
                format!("Failed to open CSV '{}': {e}", path.display()),
            )
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read> RecordReader<R> {
    pub fn from_reader(rdr: R) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(rdr);

        let headers = reader
            .headers()
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV headers: {e}")))?
            .clone();

        let header_map = build_header_map(&headers);
        ensure_required_columns_exist(&header_map)?;

        Ok(Self {
            records: reader.into_records(),
            header_map,
            next_index: 0,
        })
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<RawRecord, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let result = self.records.next()?;
            let index = self.next_index;
            self.next_index += 1;

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    return Some(Err(RowError {
                        index,
                        error: RecordError::Csv(e.to_string()),
                    }));
                }
            };

            // Rows of nothing but separators are padding, not records.
            if record.iter().all(str::is_empty) {
                continue;
            }

            return Some(
                parse_row(&record, &self.header_map, index).map_err(|error| RowError { index, error }),
            );
        }
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often start the file with a UTF-8 BOM, which lands on
    // the first header and would hide that column.
    name.trim_start_matches('\u{feff}').trim().to_string()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !header_map.contains_key(*col))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::new(
        EXIT_INPUT,
        format!("Missing required column(s): {}", missing.join(", ")),
    ))
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    index: usize,
) -> Result<RawRecord, RecordError> {
    let text = |col: &str| get_required(record, header_map, col).map(str::to_string);

    let pickup = PickupKey {
        apartment: text(COL_PICKUP_APARTMENT)?,
        building: text(COL_PICKUP_BUILDING)?,
        street: text(COL_PICKUP_STREET)?,
        postcode: text(COL_PICKUP_POSTCODE)?,
        city: text(COL_PICKUP_CITY)?,
    };

    let note = get_optional(record, header_map, COL_NOTE).map(str::to_string);

    let delivery = PostalAddress {
        apartment: text(COL_DELIVERY_APARTMENT)?,
        building: text(COL_DELIVERY_BUILDING)?,
        street: text(COL_DELIVERY_STREET)?,
        city: text(COL_DELIVERY_CITY)?,
        state: text(COL_DELIVERY_STATE)?,
        country: text(COL_DELIVERY_COUNTRY)?,
        postcode: text(COL_DELIVERY_POSTCODE)?,
        hint: note.clone(),
        ..Default::default()
    };

    let receiver = ReceiverData {
        full_name: text(COL_FULL_NAME)?,
        email: text(COL_EMAIL)?,
        phone: text(COL_PHONE)?,
    };

    let number = |col: &str| get_required(record, header_map, col).and_then(|v| parse_count(col, v));

    let parcel = ParcelSpec {
        dimension_x: number(COL_DIMENSION_X)?,
        dimension_y: number(COL_DIMENSION_Y)?,
        dimension_z: number(COL_DIMENSION_Z)?,
        requires_attention: parse_requires_attention(get_required(
            record,
            header_map,
            COL_REQUIRES_ATTENTION,
        )?),
        weight: number(COL_WEIGHT)?,
    };

    Ok(RawRecord {
        index,
        pickup,
        delivery,
        note,
        reference_number1: non_empty(get_optional(record, header_map, COL_REFERENCE_1)),
        reference_number2: non_empty(get_optional(record, header_map, COL_REFERENCE_2)),
        receiver,
        parcel,
    })
}

/// `true` for any casing of "true"; everything else (padded values included) is `false`.
pub fn parse_requires_attention(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

fn parse_count(column: &str, raw: &str) -> Result<u32, RecordError> {
    raw.trim().parse::<u32>().map_err(|_| RecordError::InvalidNumber {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    column: &str,
) -> Result<&'a str, RecordError> {
    header_map
        .get(column)
        .and_then(|&idx| record.get(idx))
        .ok_or_else(|| RecordError::MissingField(column.to_string()))
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    column: &str,
) -> Option<&'a str> {
    header_map.get(column).and_then(|&idx| record.get(idx))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "apartment(PickUp),building(PickUp),street(PickUp),postcode(PickUp),city(PickUp),\
apartment(Delivery),building(Delivery),street(Delivery),city(Delivery),state(Delivery),country(Delivery),postcode(Delivery),\
fullName,email,phone,note,referenceNumber1,referenceNumber2,dimension_x,dimension_y,dimension_z,weight,requiresAttention";

    fn row(dims: &str, attention: &str) -> String {
        format!(
            "2,B,Main,00000,Springfield,5,C,Elm,Shelbyville,IL,US,11111,Ann Lee,ann@example.com,555-0100,leave at door,REF-1,,{dims},{attention}"
        )
    }

    fn read_all(csv: &str) -> Vec<Result<RawRecord, RowError>> {
        RecordReader::from_reader(csv.as_bytes()).unwrap().collect()
    }

    #[test]
    fn reads_typed_record() {
        let csv = format!("{HEADER}\n{}\n", row("10,20,30,4", "TRUE"));
        let rows = read_all(&csv);
        assert_eq!(rows.len(), 1);

        let rec = rows[0].as_ref().unwrap();
        assert_eq!(rec.index, 0);
        assert_eq!(rec.pickup.street, "Main");
        assert_eq!(rec.pickup.postcode, "00000");
        assert_eq!(rec.delivery.city, "Shelbyville");
        assert_eq!(rec.delivery.hint.as_deref(), Some("leave at door"));
        assert_eq!(rec.delivery.latitude, None);
        assert_eq!(rec.reference_number1.as_deref(), Some("REF-1"));
        assert_eq!(rec.reference_number2, None);
        assert_eq!(rec.receiver.full_name, "Ann Lee");
        assert_eq!(
            rec.parcel,
            ParcelSpec {
                dimension_x: 10,
                dimension_y: 20,
                dimension_z: 30,
                requires_attention: true,
                weight: 4,
            }
        );
    }

    #[test]
    fn strips_bom_from_first_header() {
        let csv = format!("\u{feff}{HEADER}\n{}\n", row("1,1,1,1", "false"));
        let rows = read_all(&csv);
        assert_eq!(rows[0].as_ref().unwrap().pickup.apartment, "2");
    }

    #[test]
    fn requires_attention_is_case_insensitive() {
        assert!(parse_requires_attention("true"));
        assert!(parse_requires_attention("TRUE"));
        assert!(parse_requires_attention("True"));
        assert!(!parse_requires_attention("yes"));
        assert!(!parse_requires_attention("1"));
        assert!(!parse_requires_attention(""));
        assert!(!parse_requires_attention(" true "));
    }

    #[test]
    fn values_are_not_trimmed() {
        let csv = format!(
            "{HEADER}\n2,B,  Main  ,00000,Springfield,5,C,Elm ,Shelbyville,IL,US,11111,Ann Lee,ann@example.com,555-0100,,,,1, 2 ,3,4, true \n"
        );
        let rows = read_all(&csv);
        let rec = rows[0].as_ref().unwrap();
        assert_eq!(rec.pickup.street, "  Main  ");
        assert_eq!(rec.delivery.street, "Elm ");
        assert!(!rec.parcel.requires_attention);
        // Numbers still tolerate surrounding blanks.
        assert_eq!(rec.parcel.dimension_y, 2);
    }

    #[test]
    fn padded_header_names_still_resolve() {
        let header = HEADER.replace("weight,", " weight ,");
        let csv = format!("{header}\n{}\n", row("1,2,3,4", "true"));
        let rows = read_all(&csv);
        assert_eq!(rows[0].as_ref().unwrap().parcel.weight, 4);
    }

    #[test]
    fn bad_numbers_fail_only_their_row() {
        let csv = format!(
            "{HEADER}\n{}\n{}\n{}\n{}\n",
            row("1,2,3,4", "false"),
            row("abc,2,3,4", "false"),
            row("1,-2,3,4", "false"),
            row("1,2,3,", "false"),
        );
        let rows = read_all(&csv);
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_ok());

        let err = rows[1].as_ref().unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(
            err.error,
            RecordError::InvalidNumber {
                column: COL_DIMENSION_X.to_string(),
                value: "abc".to_string(),
            }
        );
        assert_eq!(rows[2].as_ref().unwrap_err().index, 2);
        assert!(matches!(
            rows[3].as_ref().unwrap_err().error,
            RecordError::InvalidNumber { ref column, .. } if column == COL_WEIGHT
        ));
    }

    #[test]
    fn short_row_reports_missing_field() {
        let csv = format!("{HEADER}\n2,B,Main\n");
        let rows = read_all(&csv);
        assert!(matches!(
            rows[0].as_ref().unwrap_err().error,
            RecordError::MissingField(_)
        ));
    }

    #[test]
    fn blank_rows_are_skipped_but_keep_positions() {
        let blank = ",".repeat(22);
        let csv = format!(
            "{HEADER}\n{}\n{blank}\n{}\n",
            row("1,1,1,1", "false"),
            row("2,2,2,2", "false")
        );
        let rows = read_all(&csv);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].as_ref().unwrap().index, 2);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let header = HEADER.replace(",weight,", ",");
        let err = RecordReader::from_reader(format!("{header}\n").as_bytes())
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(err.to_string().contains("weight"));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let header = "apartment(PickUp),building(PickUp),street(PickUp),postcode(PickUp),city(PickUp),\
apartment(Delivery),building(Delivery),street(Delivery),city(Delivery),state(Delivery),country(Delivery),postcode(Delivery),\
fullName,email,phone,dimension_x,dimension_y,dimension_z,weight,requiresAttention";
        let csv = format!(
            "{header}\n2,B,Main,00000,Springfield,5,C,Elm,Shelbyville,IL,US,11111,Ann,a@b.c,1,1,1,1,1,no\n"
        );
        let rows = read_all(&csv);
        let rec = rows[0].as_ref().unwrap();
        assert_eq!(rec.note, None);
        assert_eq!(rec.delivery.hint, None);
        assert_eq!(rec.reference_number1, None);
        assert!(!rec.parcel.requires_attention);
    }

    #[test]
    fn open_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "{}", row("1,2,3,4", "true")).unwrap();

        let reader = RecordReader::open(file.path()).unwrap();
        let records: Vec<_> = reader.collect();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_ok());
    }

    #[test]
    fn open_missing_file_is_fatal() {
        let err = RecordReader::open(Path::new("does-not-exist.csv")).err().unwrap();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }
}
