use crate::codec::{Codec, entry_options};
use crate::domain::SourceFile;
use crate::error::Result;
use std::collections::HashMap;
use std::fs::{File, Metadata};
use std::io::{ErrorKind, Read, Seek, Write};
use zip::ZipWriter;

const IO_BUF: usize = 64 * 1024;

/// What happened to one source file.
#[derive(Debug)]
pub enum EntryOutcome {
    Written,
    /// The source could not be read; the entry was not kept.
    Skipped(String),
}

/// Settings every entry in one run is written with.
#[derive(Copy, Clone)]
pub struct EntryStyle<'k> {
    pub codec: Codec,
    pub level: i32,
    pub password: Option<&'k str>,
}

/// Streams one file into `zip`. Failures on the source side yield
/// `Skipped`; failures writing the archive are returned as errors.
pub fn stream_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    src: &SourceFile,
    style: EntryStyle<'_>,
) -> Result<EntryOutcome> {
    let mut f = match File::open(&src.abs_path) {
        Ok(f) => f,
        Err(e) => return Ok(EntryOutcome::Skipped(format!("open failed: {e}"))),
    };
    let meta = match f.metadata() {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Ok(EntryOutcome::Skipped("not a regular file".into())),
        Err(e) => return Ok(EntryOutcome::Skipped(format!("stat failed: {e}"))),
    };

    stream_entry(zip, &src.entry_name, &mut f, &meta, style)
}

/// Copies `reader` into a new entry named `name`. A read error rolls the
/// entry back out of the archive and yields `Skipped`.
pub fn stream_entry<W: Write + Seek, R: Read>(
    zip: &mut ZipWriter<W>,
    name: &str,
    reader: &mut R,
    meta: &Metadata,
    style: EntryStyle<'_>,
) -> Result<EntryOutcome> {
    zip.start_file(
        name,
        entry_options(style.codec, style.level, style.password, Some(meta)),
    )?;

    let mut buf = vec![0u8; IO_BUF];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                zip.abort_file()?;
                return Ok(EntryOutcome::Skipped(format!("read failed: {e}")));
            }
        };
        zip.write_all(&buf[..n])?;
    }
    Ok(EntryOutcome::Written)
}

/// Appends an entry whose contents were already read into memory.
pub fn write_buffered<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    src: &SourceFile,
    data: &[u8],
    meta: &Metadata,
    style: EntryStyle<'_>,
) -> Result<()> {
    zip.start_file(
        src.entry_name.as_str(),
        entry_options(style.codec, style.level, style.password, Some(meta)),
    )?;
    zip.write_all(data)?;
    Ok(())
}

/// Reads a whole source file, for the buffered direct strategy.
pub fn read_whole(src: &SourceFile) -> std::result::Result<(Vec<u8>, Metadata), String> {
    let meta = std::fs::metadata(&src.abs_path).map_err(|e| format!("stat failed: {e}"))?;
    if !meta.is_file() {
        return Err("not a regular file".into());
    }
    let data = std::fs::read(&src.abs_path).map_err(|e| format!("read failed: {e}"))?;
    Ok((data, meta))
}

/// For each name, whether it survives: a later entry with the same name
/// replaces an earlier one.
pub fn last_wins<'a, I>(names: I) -> Vec<bool>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    let mut last: HashMap<&str, usize> = HashMap::with_capacity(names.len());
    for (i, n) in names.iter().enumerate() {
        last.insert(*n, i);
    }
    names
        .iter()
        .enumerate()
        .map(|(i, n)| last.get(n) == Some(&i))
        .collect()
}
