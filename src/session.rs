use crate::archive::ArchiveEntry;
use crate::job_api::JobClient;
use crate::mutation_cache::MutationDataCache;
use crate::result_files::ResultFileSet;
use crate::viewer::RenderEngine;
use std::collections::HashMap;

/// Where every file fetch of the current session goes. Set once when a job
/// starts or an archive is opened, never mixed within a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionMode {
    Remote { job_id: String },
    Archive,
}

/// Uniform access to result-file content, remote or offline.
pub trait FileSource {
    fn fetch(&self, filename: &str) -> Result<String, String>;
}

/// Fetches result files from the remote job API.
pub struct RemoteSource {
    client: JobClient,
    job_id: String,
}

impl RemoteSource {
    pub fn new(client: JobClient, job_id: &str) -> Self {
        Self {
            client,
            job_id: job_id.to_string(),
        }
    }
}

impl FileSource for RemoteSource {
    fn fetch(&self, filename: &str) -> Result<String, String> {
        self.client.fetch_result_file(&self.job_id, filename)
    }
}

/// Serves result files from the entries of an opened offline archive.
pub struct ArchiveSource {
    entries: HashMap<String, String>,
}

impl ArchiveSource {
    /// Keeps the text entries; non-text entries (exported snapshots) are not
    /// part of the correlation data and are dropped here.
    pub fn new(entries: &[ArchiveEntry]) -> Self {
        let entries = entries
            .iter()
            .filter_map(|e| Some((e.name.clone(), e.as_text().ok()?.to_string())))
            .collect();
        Self { entries }
    }
}

impl FileSource for ArchiveSource {
    fn fetch(&self, filename: &str) -> Result<String, String> {
        self.entries
            .get(filename)
            .cloned()
            .ok_or_else(|| format!("Archive has no entry '{filename}'"))
    }
}

/// The process-wide mutable state of one viewing session.
///
/// Single logical owner of the mutation cache, the known result files and
/// the fetch source. `begin` is the only entry point that swaps them, and it
/// clears the render engine first, so no component can read stale state
/// across a session reset.
#[derive(Default)]
pub struct Session {
    mode: Option<SessionMode>,
    pub cache: MutationDataCache,
    files: ResultFileSet,
    source: Option<Box<dyn FileSource>>,
}

impl Session {
    /// Atomically replace the whole session: viewer structures out, cache
    /// cleared, mode and file listing swapped, then the new source installed.
    pub fn begin(
        &mut self,
        engine: &mut dyn RenderEngine,
        mode: SessionMode,
        source: Box<dyn FileSource>,
        files: ResultFileSet,
    ) {
        engine.clear();
        self.cache.clear();
        self.mode = Some(mode);
        self.files = files;
        self.source = Some(source);
    }

    pub fn mode(&self) -> Option<&SessionMode> {
        self.mode.as_ref()
    }

    pub fn files(&self) -> &ResultFileSet {
        &self.files
    }

    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    /// Fetch one result file through the session's source.
    pub fn fetch(&self, filename: &str) -> Result<String, String> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| "No job or archive loaded".to_string())?;
        source.fetch(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::HeadlessEngine;

    fn archive_session() -> (Session, HeadlessEngine) {
        let mut session = Session::default();
        let mut engine = HeadlessEngine::new();
        let entries = vec![
            ArchiveEntry::text("inter_ener_glu60c.ene", "PROC_60_E2A -3.45\n"),
            ArchiveEntry::text("joined_proc_60_e2a.pdb", "ATOM\n"),
        ];
        let files = ResultFileSet::new(entries.iter().map(|e| e.name.clone()).collect());
        session.begin(
            &mut engine,
            SessionMode::Archive,
            Box::new(ArchiveSource::new(&entries)),
            files,
        );
        (session, engine)
    }

    #[test]
    fn fetch_without_a_session_is_a_user_error() {
        let session = Session::default();
        assert!(!session.is_active());
        assert!(session.fetch("x.pdb").is_err());
    }

    #[test]
    fn archive_source_serves_entries_by_name() {
        let (session, _engine) = archive_session();
        assert_eq!(session.mode(), Some(&SessionMode::Archive));
        assert!(session.fetch("inter_ener_glu60c.ene").unwrap().contains("-3.45"));
        let err = session.fetch("missing.pdb").unwrap_err();
        assert!(err.contains("missing.pdb"));
    }

    #[test]
    fn begin_clears_cache_engine_and_file_list() {
        let (mut session, mut engine) = archive_session();
        session
            .cache
            .put("old", crate::energy_table::parse("r1_A 1.0", "old"));
        let _ = engine
            .load_structure(
                "old",
                &crate::structure::test_pdb::atom_line(1, "CA", "ALA", "A", 1, ""),
            )
            .unwrap();

        session.begin(
            &mut engine,
            SessionMode::Remote {
                job_id: "j1".to_string(),
            },
            Box::new(ArchiveSource::new(&[])),
            ResultFileSet::default(),
        );
        assert!(session.cache.is_empty());
        assert!(session.files().is_empty());
        assert!(crate::viewer::RenderEngine::loaded_handles(&engine).is_empty());
        assert_eq!(
            session.mode(),
            Some(&SessionMode::Remote {
                job_id: "j1".to_string()
            })
        );
    }
}
