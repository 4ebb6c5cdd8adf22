use crate::domain::FragmentRecord;
use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only index from a backup's file name to where its fragments live.
///
/// Callers own the single-writer discipline: one `&mut` handle appends at a
/// time.
pub trait FragmentLog {
    fn append(&mut self, record: FragmentRecord) -> Result<()>;

    /// Every record for `filename`, in append order.
    fn fragments_for(&self, filename: &str) -> Vec<FragmentRecord>;
}

/// Registry persisted as a two-column CSV (`filename`, `path`). The whole
/// table is loaded on open and rewritten on every append.
pub struct CsvRegistry {
    path: PathBuf,
    rows: Vec<FragmentRecord>,
}

impl CsvRegistry {
    pub fn open(path: &Path) -> Result<Self> {
        let rows = if path.exists() {
            let mut rdr = csv::Reader::from_path(path)?;
            rdr.deserialize::<FragmentRecord>()
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };
        tracing::debug!(path = %path.display(), rows = rows.len(), "registry loaded");
        Ok(Self {
            path: path.to_path_buf(),
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut wtr = csv::Writer::from_writer(tmp.as_file_mut());
            for r in &self.rows {
                wtr.serialize(r)?;
            }
            wtr.flush()?;
        }
        tmp.as_file_mut().flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl FragmentLog for CsvRegistry {
    fn append(&mut self, record: FragmentRecord) -> Result<()> {
        self.rows.push(record);
        if let Err(e) = self.save() {
            self.rows.pop();
            return Err(e);
        }
        Ok(())
    }

    fn fragments_for(&self, filename: &str) -> Vec<FragmentRecord> {
        self.rows
            .iter()
            .filter(|r| r.filename == filename)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, path: &str) -> FragmentRecord {
        FragmentRecord {
            filename: name.into(),
            path: path.into(),
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reg = CsvRegistry::open(&dir.path().join("db.csv")).unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn appends_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("db.csv");
        {
            let mut reg = CsvRegistry::open(&db).unwrap();
            reg.append(rec("a.zip", "/mnt/u1/a.part001")).unwrap();
            reg.append(rec("b.zip", "/mnt/u1/b.part001")).unwrap();
            reg.append(rec("a.zip", "/mnt/u2/a.part002")).unwrap();
        }
        let text = fs::read_to_string(&db).unwrap();
        assert!(text.starts_with("filename,path\n"));

        let reg = CsvRegistry::open(&db).unwrap();
        assert_eq!(reg.len(), 3);
        assert_eq!(
            reg.fragments_for("a.zip"),
            vec![rec("a.zip", "/mnt/u1/a.part001"), rec("a.zip", "/mnt/u2/a.part002")]
        );
        assert!(reg.fragments_for("c.zip").is_empty());
    }
}
