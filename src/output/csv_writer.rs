use std::fs::File;
use std::path::{Path, PathBuf};

use crate::annotator::Annotation;
use crate::error::{PipelineError, PipelineResult};
use crate::shared::constants;
use crate::utils::time_utils::format_timestamp;

/// One persisted line of the output table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub timestamp: f64,
    pub title: String,
    pub caption: String,
    pub scene_description: String,
    pub persons: String,
    pub objects: String,
}

impl Row {
    pub fn from_annotation(timestamp: f64, annotation: &Annotation) -> Self {
        Self {
            timestamp,
            title: annotation.title.clone(),
            caption: annotation.caption.clone(),
            scene_description: annotation.scene_description.clone(),
            persons: annotation.persons_text(),
            objects: annotation.objects_text(),
        }
    }

    fn record(&self) -> [String; 6] {
        [
            format_timestamp(self.timestamp),
            self.title.clone(),
            self.caption.clone(),
            self.scene_description.clone(),
            self.persons.clone(),
            self.objects.clone(),
        ]
    }
}

/// Streams rows to a CSV file, flushing after every row so an interrupted run still
/// leaves a readable file behind.
pub struct TableWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: u64,
}

impl TableWriter {
    /// Creates (or truncates) `path` and writes the header.
    pub fn create(path: &Path) -> PipelineResult<Self> {
        let file = File::create(path)
            .map_err(|e| PipelineError::Write(format!("{}: {}", path.display(), e)))?;

        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(file);
        writer.write_record(constants::CSV_HEADER)?;
        writer
            .flush()
            .map_err(|e| PipelineError::Write(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows: 0,
        })
    }

    pub fn append(&mut self, row: &Row) -> PipelineResult<()> {
        self.writer.write_record(row.record())?;
        self.writer
            .flush()
            .map_err(|e| PipelineError::Write(format!("{}: {}", self.path.display(), e)))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes and closes the file, returning how many rows it holds.
    pub fn finalize(mut self) -> PipelineResult<u64> {
        self.writer
            .flush()
            .map_err(|e| PipelineError::Write(format!("{}: {}", self.path.display(), e)))?;
        Ok(self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(title: &str, persons: &[&str], objects: &[&str]) -> Annotation {
        Annotation {
            title: title.to_string(),
            caption: "Someone waves at the camera.".to_string(),
            scene_description: "A garden, \"summer\" light,\nsecond line.".to_string(),
            persons: persons.iter().map(|s| s.to_string()).collect(),
            objects: objects.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        let writer = TableWriter::create(&path).unwrap();
        assert_eq!(writer.finalize().unwrap(), 0);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "timestamp,title,caption,scene_description,persons,objects\n");
    }

    #[test]
    fn test_rows_are_visible_before_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");

        let mut writer = TableWriter::create(&path).unwrap();
        writer
            .append(&Row::from_annotation(0.0, &annotation("Garden", &["man"], &["hose"])))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next().unwrap(), constants::CSV_HEADER.join(","));
        assert!(content.contains("Garden"));
        assert_eq!(writer.rows_written(), 1);
    }

    #[test]
    fn test_round_trip_with_awkward_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.csv");

        let rows = vec![
            Row::from_annotation(0.0, &annotation("Garden, Day", &["man in hat", "dog"], &["hose", "bucket"])),
            Row::from_annotation(5.0, &annotation("Say \"cheese\"", &[], &["camera"])),
            Row::from_annotation(7.5, &annotation("Plain", &["woman"], &[])),
        ];

        let mut writer = TableWriter::create(&path).unwrap();
        for row in &rows {
            writer.append(row).unwrap();
        }
        assert_eq!(writer.finalize().unwrap(), 3);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), constants::CSV_HEADER.to_vec());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), rows.len());

        for (record, row) in records.iter().zip(&rows) {
            assert_eq!(record.len(), 6);
            assert_eq!(record[0].parse::<f64>().unwrap(), row.timestamp);
            assert_eq!(&record[1], row.title);
            assert_eq!(&record[3], row.scene_description);
        }

        let persons: Vec<&str> = records[0][4].split(',').map(str::trim).collect();
        assert_eq!(persons, vec!["man in hat", "dog"]);
        assert_eq!(&records[1][4], "");
        assert_eq!(&records[2][5], "");
    }

    #[test]
    fn test_unwritable_destination_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-subdir").join("out.csv");

        assert!(matches!(TableWriter::create(&path), Err(PipelineError::Write(_))));
    }
}
