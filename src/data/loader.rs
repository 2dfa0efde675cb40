//! Data Loader Module
//! Resolves a DataFrame from uploaded bytes (CSV, Excel, delimited text) or
//! from the synthetic generator.

use crate::data::generator::{DataGenerator, GeneratorSpec};
use calamine::{Data, Reader, Xlsx};
use polars::prelude::*;
use serde::Deserialize;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("No data source provided")]
    NoSource,
    #[error("Failed to parse file ({})", .attempts.join("; "))]
    Parse { attempts: Vec<String> },
    #[error("File is not valid {encoding}: {message}")]
    Decode {
        encoding: TextEncoding,
        message: String,
    },
    #[error("Loaded data is empty")]
    Empty,
    #[error("Sample count {requested} outside {min}..={max}")]
    SampleCount {
        requested: usize,
        min: usize,
        max: usize,
    },
    #[error("Generator error: {0}")]
    Generator(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Declared format of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
    /// Delimited text with an unknown delimiter: tab first, then comma.
    Text,
}

impl FileFormat {
    pub const ALL: [FileFormat; 3] = [FileFormat::Csv, FileFormat::Excel, FileFormat::Text];

    pub fn label(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Excel => "xlsx",
            FileFormat::Text => "txt",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" | "xlsm" => Some(FileFormat::Excel),
            "txt" | "tsv" => Some(FileFormat::Text),
            _ => None,
        }
    }
}

/// Character encoding applied to CSV and text uploads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "cp1252", alias = "windows-1252")]
    Windows1252,
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Code points for Windows-1252 bytes 0x80..=0x9F. Unassigned bytes map to
/// the matching C1 control, as Latin-1 does.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

impl TextEncoding {
    pub const ALL: [TextEncoding; 3] = [
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Windows1252 => "cp1252",
        }
    }

    /// Decode raw bytes into UTF-8 text.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, IntakeError> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                String::from_utf8(bytes.to_vec()).map_err(|e| IntakeError::Decode {
                    encoding: *self,
                    message: e.to_string(),
                })
            }
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Windows1252 => Ok(bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
                    _ => b as char,
                })
                .collect()),
        }
    }
}

/// Where the dataset comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Upload {
        name: String,
        bytes: Vec<u8>,
        format: FileFormat,
        encoding: TextEncoding,
        /// CSV delimiter; comma when unset. Ignored for text and Excel.
        delimiter: Option<u8>,
    },
    Generate(GeneratorSpec),
}

impl DataSource {
    pub fn name(&self) -> String {
        match self {
            DataSource::Upload { name, .. } => name.clone(),
            DataSource::Generate(spec) => format!("random data ({} samples)", spec.sample_count),
        }
    }
}

/// Holds the most recently loaded DataFrame.
pub struct DataLoader {
    df: Option<DataFrame>,
    source_name: Option<String>,
    delimiter: Option<u8>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            source_name: None,
            delimiter: None,
        }
    }

    /// Load a dataset from the given source, replacing any previous one.
    ///
    /// On failure the previously loaded frame is discarded as well.
    pub fn load(&mut self, source: Option<DataSource>) -> Result<&DataFrame, IntakeError> {
        self.df = None;
        self.source_name = None;
        self.delimiter = None;

        let source = source.ok_or(IntakeError::NoSource)?;
        let (df, delimiter) = Self::read_source(&source)?;

        log::info!(
            "Loaded {}: {} rows, {} columns",
            source.name(),
            df.height(),
            df.width()
        );

        self.source_name = Some(source.name());
        self.delimiter = delimiter;
        self.df = Some(df);
        self.df.as_ref().ok_or(IntakeError::Empty)
    }

    /// Resolve a source into a frame without touching loader state.
    /// Also returns the delimiter that succeeded for CSV and text uploads.
    pub fn read_source(source: &DataSource) -> Result<(DataFrame, Option<u8>), IntakeError> {
        let (df, delimiter) = match source {
            DataSource::Upload {
                bytes,
                format,
                encoding,
                delimiter,
                ..
            } => match format {
                FileFormat::Csv => {
                    let text = Self::decode_non_empty(bytes, *encoding)?;
                    let separator = delimiter.unwrap_or(b',');
                    let df = Self::parse_delimited(&text, separator).map_err(|e| {
                        IntakeError::Parse {
                            attempts: vec![format!(
                                "{} with {}: {}",
                                delimiter_name(separator),
                                encoding,
                                e
                            )],
                        }
                    })?;
                    (df, Some(separator))
                }
                FileFormat::Text => {
                    let text = Self::decode_non_empty(bytes, *encoding)?;
                    let (df, separator) = Self::parse_text(&text, *encoding)?;
                    (df, Some(separator))
                }
                FileFormat::Excel => (Self::parse_excel(bytes)?, None),
            },
            DataSource::Generate(spec) => (DataGenerator::generate(spec)?, None),
        };

        if df.width() == 0 {
            return Err(IntakeError::Empty);
        }
        Ok((df, delimiter))
    }

    fn decode_non_empty(bytes: &[u8], encoding: TextEncoding) -> Result<String, IntakeError> {
        let text = encoding.decode(bytes)?;
        if text.trim().is_empty() {
            return Err(IntakeError::Empty);
        }
        Ok(text)
    }

    fn parse_delimited(text: &str, separator: u8) -> PolarsResult<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_parse_options(CsvParseOptions::default().with_separator(separator))
            .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
            .finish()
    }

    /// Two-step parse for text uploads: tab-delimited first, then the same
    /// text re-read from the start with a comma delimiter.
    fn parse_text(text: &str, encoding: TextEncoding) -> Result<(DataFrame, u8), IntakeError> {
        let tab_failure = match Self::parse_delimited(text, b'\t') {
            Ok(df) if !Self::is_misread_comma_file(text, &df) => {
                log::info!("Parsed text upload as tab-delimited");
                return Ok((df, b'\t'));
            }
            Ok(_) => "single column with a comma-separated header".to_string(),
            Err(e) => e.to_string(),
        };

        log::warn!(
            "Tab-delimited parse failed ({}), retrying with comma delimiter",
            tab_failure
        );

        match Self::parse_delimited(text, b',') {
            Ok(df) => {
                log::info!("Parsed text upload as comma-delimited");
                Ok((df, b','))
            }
            Err(e) => Err(IntakeError::Parse {
                attempts: vec![
                    format!("tab with {}: {}", encoding, tab_failure),
                    format!("comma with {}: {}", encoding, e),
                ],
            }),
        }
    }

    /// A comma file read with a tab delimiter comes back as one column.
    fn is_misread_comma_file(text: &str, df: &DataFrame) -> bool {
        df.width() == 1 && text.lines().next().is_some_and(|header| header.contains(','))
    }

    /// Read the first worksheet of an xlsx workbook. The first row holds the
    /// column names.
    fn parse_excel(bytes: &[u8]) -> Result<DataFrame, IntakeError> {
        let excel_err = |e: calamine::XlsxError| IntakeError::Parse {
            attempts: vec![format!("excel: {}", e)],
        };

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(excel_err)?;
        let Some(sheet) = workbook.sheet_names().first().cloned() else {
            return Err(IntakeError::Empty);
        };
        let range = workbook.worksheet_range(&sheet).map_err(excel_err)?;
        if range.is_empty() {
            return Err(IntakeError::Empty);
        }

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| match cell {
                        Data::Empty => format!("Column{}", i + 1),
                        Data::String(s) if s.trim().is_empty() => format!("Column{}", i + 1),
                        Data::String(s) => s.trim().to_string(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let body: Vec<&[Data]> = rows.collect();

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| Self::excel_column(name, &body, idx))
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    /// Numeric when every non-empty cell is an int or float, text otherwise.
    fn excel_column(name: &str, body: &[&[Data]], idx: usize) -> Column {
        let cells = || body.iter().map(move |row| row.get(idx).unwrap_or(&Data::Empty));

        let numeric = cells().all(|cell| matches!(cell, Data::Empty | Data::Int(_) | Data::Float(_)));
        if numeric {
            let values: Vec<Option<f64>> = cells()
                .map(|cell| match cell {
                    Data::Int(i) => Some(*i as f64),
                    Data::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        } else {
            let values: Vec<Option<String>> = cells()
                .map(|cell| match cell {
                    Data::Empty => None,
                    other => Some(other.to_string()),
                })
                .collect();
            Column::new(name.into(), values)
        }
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    pub fn get_source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Delimiter that succeeded for the last CSV or text upload.
    pub fn get_delimiter(&self) -> Option<u8> {
        self.delimiter
    }
}

pub fn delimiter_name(separator: u8) -> String {
    match separator {
        b'\t' => "tab".to_string(),
        b',' => "comma".to_string(),
        b';' => "semicolon".to_string(),
        b'|' => "pipe".to_string(),
        other => format!("'{}'", other as char),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(bytes: &[u8], format: FileFormat) -> DataSource {
        DataSource::Upload {
            name: "test".to_string(),
            bytes: bytes.to_vec(),
            format,
            encoding: TextEncoding::Utf8,
            delimiter: None,
        }
    }

    #[test]
    fn test_no_source_is_error() {
        let mut loader = DataLoader::new();
        assert!(matches!(loader.load(None), Err(IntakeError::NoSource)));
        assert!(loader.get_dataframe().is_none());
    }

    #[test]
    fn test_load_csv() {
        let mut loader = DataLoader::new();
        let df = loader
            .load(Some(upload(b"a,b,name\n1,2.5,x\n3,4.5,y\n", FileFormat::Csv)))
            .unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(df.height(), 2);
        assert_eq!(loader.get_columns(), vec!["a", "b", "name"]);
        assert_eq!(loader.get_delimiter(), Some(b','));
    }

    #[test]
    fn test_csv_custom_delimiter() {
        let source = DataSource::Upload {
            name: "semi".to_string(),
            bytes: b"a;b\n1;2\n".to_vec(),
            format: FileFormat::Csv,
            encoding: TextEncoding::Utf8,
            delimiter: Some(b';'),
        };
        let (df, delimiter) = DataLoader::read_source(&source).unwrap();
        assert_eq!(df.width(), 2);
        assert_eq!(delimiter, Some(b';'));
    }

    #[test]
    fn test_text_prefers_tab() {
        let (df, delimiter) =
            DataLoader::read_source(&upload(b"a\tb\n1\t2\n3\t4\n", FileFormat::Text)).unwrap();
        assert_eq!(df.width(), 2);
        assert_eq!(delimiter, Some(b'\t'));
    }

    #[test]
    fn test_text_falls_back_to_comma() {
        let (df, delimiter) =
            DataLoader::read_source(&upload(b"a,b,c\n1,2,3\n4,5,6\n", FileFormat::Text)).unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(df.height(), 2);
        assert_eq!(delimiter, Some(b','));
    }

    #[test]
    fn test_empty_file_fails() {
        for format in [FileFormat::Csv, FileFormat::Text] {
            let result = DataLoader::read_source(&upload(b"", format));
            assert!(matches!(result, Err(IntakeError::Empty)));
            let result = DataLoader::read_source(&upload(b"\xEF\xBB\xBF\n \n", format));
            assert!(matches!(result, Err(IntakeError::Empty)));
        }
    }

    #[test]
    fn test_text_reports_both_failed_attempts() {
        // the header reads as one comma column under tab, and the ragged row
        // has more fields than the comma header
        let result = DataLoader::read_source(&upload(b"a,b\n1,2,3,4\n", FileFormat::Text));
        let Err(IntakeError::Parse { attempts }) = result else {
            panic!("expected both text attempts to fail");
        };
        assert_eq!(attempts.len(), 2);
        assert!(attempts[0].starts_with("tab"));
        assert!(attempts[1].starts_with("comma"));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let result = DataLoader::read_source(&upload(b"name\ncaf\xE9\n", FileFormat::Csv));
        assert!(matches!(result, Err(IntakeError::Decode { .. })));
    }

    #[test]
    fn test_latin1_and_cp1252_decode() {
        assert_eq!(TextEncoding::Latin1.decode(b"caf\xE9").unwrap(), "café");
        assert_eq!(TextEncoding::Windows1252.decode(b"\x80 5").unwrap(), "€ 5");
        assert_eq!(TextEncoding::Latin1.decode(b"\x80").unwrap(), "\u{80}");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let (df, _) =
            DataLoader::read_source(&upload(b"\xEF\xBB\xBFa,b\n1,2\n", FileFormat::Csv)).unwrap();
        assert_eq!(df.get_column_names()[0].as_str(), "a");
    }

    #[test]
    fn test_invalid_excel_is_parse_error() {
        let result = DataLoader::read_source(&upload(b"not a workbook", FileFormat::Excel));
        assert!(matches!(result, Err(IntakeError::Parse { .. })));
    }

    #[test]
    fn test_failed_load_clears_previous_frame() {
        let mut loader = DataLoader::new();
        loader
            .load(Some(upload(b"a\n1\n", FileFormat::Csv)))
            .unwrap();
        assert!(loader.load(None).is_err());
        assert_eq!(loader.get_row_count(), 0);
    }

    #[test]
    fn test_default_encoding_is_utf8() {
        assert_eq!(TextEncoding::default(), TextEncoding::Utf8);
        assert_eq!(TextEncoding::default().label(), "utf-8");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_extension("CSV"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_extension("xlsx"), Some(FileFormat::Excel));
        assert_eq!(FileFormat::from_extension("txt"), Some(FileFormat::Text));
        assert_eq!(FileFormat::from_extension("pdf"), None);
    }
}
