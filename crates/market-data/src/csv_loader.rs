use crate::error::DataError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core_types::Bar;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const FIELD_COUNT: usize = 6;

/// Loads every bar from a CSV file and tags it with `symbol`.
pub fn load_csv(path: impl AsRef<Path>, symbol: &str) -> Result<Vec<Bar>, DataError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let bars = read_bars(file, symbol)?;
    tracing::info!(path = %path.display(), bars = bars.len(), "Loaded market data");
    Ok(bars)
}

/// Reads `timestamp,open,high,low,close,volume` rows.
///
/// The first row is a header and is skipped. Rows with fewer than six fields
/// are skipped; rows with six or more fields must parse or the whole read fails.
pub fn read_bars<R: Read>(reader: R, symbol: &str) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        if record.len() < FIELD_COUNT {
            skipped += 1;
            continue;
        }

        let field = |idx: usize| record.get(idx).unwrap_or_default();
        let number = |idx: usize, name: &str| {
            Decimal::from_str(field(idx))
                .or_else(|_| Decimal::from_scientific(field(idx)))
                .map_err(|err| DataError::Parse {
                    line,
                    message: format!("invalid {name} '{}': {err}", field(idx)),
                })
        };

        let timestamp = parse_timestamp(field(0)).map_err(|message| DataError::Parse { line, message })?;

        bars.push(Bar {
            symbol: symbol.to_string(),
            timestamp,
            open: number(1, "open")?,
            high: number(2, "high")?,
            low: number(3, "low")?,
            close: number(4, "close")?,
            volume: number(5, "volume")?,
        });
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped rows with fewer than {} fields", FIELD_COUNT);
    }

    Ok(bars)
}

/// Accepts `YYYY-MM-DD HH:MM:SS` (read as UTC), RFC 3339, or a bare date.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("unrecognised timestamp '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SAMPLE: &str = "\
timestamp,open,high,low,close,volume
2008-01-02 06:00:00,2060.25,2062.00,2058.50,2061.75,1520
2008-01-02 07:00:00,2061.75,2064.00,2060.00,2063.50,980
2008-01-02 08:00:00,2063.50,2063.50
2008-01-02T09:00:00Z,2063.00,2066.25,2062.75,2065.00,1104
";

    #[test]
    fn reads_rows_and_skips_short_ones() {
        let bars = read_bars(SAMPLE.as_bytes(), "NQ").expect("sample parses");

        assert_eq!(bars.len(), 3);
        assert!(bars.iter().all(|b| b.symbol == "NQ"));
        assert_eq!(
            bars[0].timestamp,
            Utc.with_ymd_and_hms(2008, 1, 2, 6, 0, 0).unwrap()
        );
        assert_eq!(bars[0].close, dec!(2061.75));
        assert_eq!(bars[1].volume, dec!(980));
        assert_eq!(
            bars[2].timestamp,
            Utc.with_ymd_and_hms(2008, 1, 2, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn reports_line_of_bad_number() {
        let input = "timestamp,open,high,low,close,volume\n2008-01-02 06:00:00,1,2,x,4,5\n";
        match read_bars(input.as_bytes(), "NQ") {
            Err(DataError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("low"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_timestamp_format() {
        let input = "timestamp,open,high,low,close,volume\n02/01/2008,1,2,1,2,5\n";
        assert!(matches!(
            read_bars(input.as_bytes(), "NQ"),
            Err(DataError::Parse { .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write sample");

        let bars = load_csv(file.path(), "ES").expect("file loads");
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[2].symbol, "ES");
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_csv("/definitely/not/here.csv", "NQ"),
            Err(DataError::Io(_))
        ));
    }
}
