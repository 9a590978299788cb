use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Archive entry name of the render-engine snapshot added on export.
pub const SNAPSHOT_ENTRY: &str = "viewer_snapshot.png";
/// Archive entry name of the combined-heatmap raster added on export.
pub const HEATMAP_ENTRY: &str = "heatmap_combined.png";

/// One archive entry: result filename and raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    pub fn text(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    /// Entry bytes as UTF-8 text; result files are text by contract.
    pub fn as_text(&self) -> Result<&str, String> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| format!("Archive entry '{}' is not text: {e}", self.name))
    }
}

/// Enumerate a result archive (tar.gz) into named entries.
///
/// Entry order is preserved; a failure reading one entry names that entry.
pub fn read_result_archive(path: &Path) -> Result<Vec<ArchiveEntry>, String> {
    let file = File::open(path)
        .map_err(|e| format!("Could not open archive '{}': {e}", path.display()))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut ret = Vec::new();
    let entries = archive
        .entries()
        .map_err(|e| format!("Could not enumerate archive '{}': {e}", path.display()))?;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| format!("Broken entry in archive '{}': {e}", path.display()))?;
        let name = entry
            .path()
            .map_err(|e| format!("Unreadable entry name in archive: {e}"))?
            .to_string_lossy()
            .to_string();
        if entry.header().entry_type().is_dir() {
            continue;
        }
        let mut bytes = Vec::new();
        let _ = entry
            .read_to_end(&mut bytes)
            .map_err(|e| format!("Could not read archive entry '{name}': {e}"))?;
        ret.push(ArchiveEntry { name, bytes });
    }
    Ok(ret)
}

/// Write the given entries as a new result archive at `path`.
pub fn write_result_archive(path: &Path, entries: &[ArchiveEntry]) -> Result<(), String> {
    let file = File::create(path)
        .map_err(|e| format!("Could not create archive '{}': {e}", path.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(entry.bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, &entry.name, entry.bytes.as_slice())
            .map_err(|e| format!("Could not write archive entry '{}': {e}", entry.name))?;
    }
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| format!("Could not finalize archive '{}': {e}", path.display()))?
        .flush()
        .map_err(|e| format!("Could not flush archive '{}': {e}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_exposes_the_same_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.tar.gz");
        let entries = vec![
            ArchiveEntry::text("joined_proc_60_e2a.pdb", "ATOM placeholder\n"),
            ArchiveEntry::text("inter_ener_glu60c.ene", "PROC_60_E2A -3.45\n"),
            ArchiveEntry {
                name: SNAPSHOT_ENTRY.to_string(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            },
        ];
        write_result_archive(&path, &entries).unwrap();

        let read_back = read_result_archive(&path).unwrap();
        assert_eq!(read_back, entries);
        assert_eq!(read_back[1].as_text().unwrap(), "PROC_60_E2A -3.45\n");
    }

    #[test]
    fn missing_archive_is_a_named_error() {
        let err = read_result_archive(Path::new("/no/such/archive.tar.gz")).unwrap_err();
        assert!(err.contains("archive.tar.gz"));
    }

    #[test]
    fn binary_entries_refuse_text_access() {
        let entry = ArchiveEntry {
            name: "heatmap_combined.png".to_string(),
            bytes: vec![0x89, 0xff, 0xfe],
        };
        assert!(entry.as_text().is_err());
    }
}
