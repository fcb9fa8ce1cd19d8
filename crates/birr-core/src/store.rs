//! Flat-file store for the unified dataset
//!
//! The entire project state is a single CSV file with one row per record.
//! The processed copy under `data/processed/` is a derived, regenerable
//! artifact of the raw file plus enrichment additions.

use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Event, ImpactLink, Observation, Record, RecordType, Target};

/// Column set of the unified schema, in file order
pub const COLUMNS: [&str; 15] = [
    "id",
    "record_type",
    "date",
    "pillar",
    "category",
    "indicator",
    "value",
    "event_ref",
    "indicator_ref",
    "lag_months",
    "effect",
    "target_value",
    "target_date",
    "source",
    "description",
];

/// An in-memory copy of a unified dataset file
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Read a unified dataset, enforcing the exact column set.
    ///
    /// A wrong header means the file is not a unified dataset at all, so
    /// this is a schema error rather than a best-effort parse.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = rdr.headers()?.clone();
        let found: Vec<&str> = headers.iter().collect();
        if found != COLUMNS {
            return Err(Error::Schema(format!(
                "unexpected columns: expected [{}], found [{}]",
                COLUMNS.join(","),
                found.join(",")
            )));
        }

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: Record = result?;
            records.push(record);
        }

        debug!("Read {} records", records.len());
        Ok(Self { records })
    }

    /// Read a dataset from disk, failing loudly on a missing file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "dataset file not found: {}",
                path.display()
            )));
        }
        let file = std::fs::File::open(path)?;
        Self::read_csv(file)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the dataset to disk, creating parent directories as needed
    pub fn to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records_of(&self, kind: RecordType) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(move |r| r.kind().map(|k| k == kind).unwrap_or(false))
    }

    /// Typed observation rows. Rows that fail conversion are skipped here;
    /// surfacing them is the validation step's job.
    pub fn observations(&self) -> Vec<Observation> {
        self.typed(RecordType::Observation, Observation::from_record)
    }

    pub fn events(&self) -> Vec<Event> {
        self.typed(RecordType::Event, Event::from_record)
    }

    pub fn impact_links(&self) -> Vec<ImpactLink> {
        self.typed(RecordType::ImpactLink, ImpactLink::from_record)
    }

    pub fn targets(&self) -> Vec<Target> {
        self.typed(RecordType::Target, Target::from_record)
    }

    fn typed<T>(&self, kind: RecordType, convert: fn(&Record) -> Result<T>) -> Vec<T> {
        self.records_of(kind)
            .filter_map(|rec| match convert(rec) {
                Ok(t) => Some(t),
                Err(e) => {
                    debug!("Skipping malformed {} row: {}", kind, e);
                    None
                }
            })
            .collect()
    }

    /// Indicator codes seen in observations and targets, sorted and deduped
    pub fn indicator_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .observations()
            .into_iter()
            .map(|o| o.indicator)
            .chain(self.targets().into_iter().map(|t| t.indicator))
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

/// Content hash of a record over every schema field except the id.
///
/// Used by enrichment to recognize a row it has already appended even when
/// the id differs, which is what makes re-running enrichment a no-op.
pub fn record_hash(record: &Record) -> String {
    let mut hasher = Sha256::new();
    let fields = [
        Some(&record.record_type),
        record.date.as_ref(),
        record.pillar.as_ref(),
        record.category.as_ref(),
        record.indicator.as_ref(),
        record.value.as_ref(),
        record.event_ref.as_ref(),
        record.indicator_ref.as_ref(),
        record.lag_months.as_ref(),
        record.effect.as_ref(),
        record.target_value.as_ref(),
        record.target_date.as_ref(),
        record.source.as_ref(),
        record.description.as_ref(),
    ];
    for field in fields {
        hasher.update(field.map(String::as_bytes).unwrap_or_default());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}
