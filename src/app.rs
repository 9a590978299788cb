use crate::archive::{self, ArchiveEntry, HEATMAP_ENTRY, SNAPSHOT_ENTRY};
use crate::energy_matrix::EnergyMatrix;
use crate::energy_table;
use crate::events::{AppEvent, EventQueue};
use crate::heatmap::HeatmapRenderer;
use crate::job_api::{JobClient, JobSubmission};
use crate::polling::JobPoller;
use crate::residue_locator::{self, LocatedResidue};
use crate::result_files::{decode_structure_name, table_key_of, ResultFileSet};
use crate::session::{ArchiveSource, RemoteSource, Session, SessionMode};
use crate::structure_resolver::{self, SelectionContext};
use crate::viewer::{RenderEngine, Representation, Selection, StructureHandle};
use crate::AMINO_ACIDS;
use anyhow::{anyhow, Result};
use std::path::Path;

/// Orchestrates one viewing session around a render engine.
///
/// Owns the session state and the event queue; every user-facing operation
/// goes through here. Failures degrade to queued warnings/errors and a
/// return to a stable, interactive state.
pub struct ViewerApp<E: RenderEngine> {
    engine: E,
    session: Session,
    pub events: EventQueue,
    selection: SelectionContext,
    /// Structure loaded by the last heatmap click, if any.
    current_structure: Option<StructureHandle>,
    loading: bool,
}

impl<E: RenderEngine> ViewerApp<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            session: Session::default(),
            events: EventQueue::default(),
            selection: SelectionContext::Combined,
            current_structure: None,
            loading: false,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selection(&self) -> &SelectionContext {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Handle of the structure loaded by the last heatmap click, if any.
    pub fn current_structure(&self) -> Option<StructureHandle> {
        self.current_structure
    }

    /// Submit a job, poll it to completion, then load its results.
    pub fn start_job(
        &mut self,
        client: &JobClient,
        submission: &JobSubmission,
        poller: &JobPoller,
    ) -> Result<()> {
        // Input validation happens before any network call.
        if submission.structure_pdb.trim().is_empty() {
            self.events.warn("A structure file is required to start a job");
            return Err(anyhow!("Missing structure"));
        }
        if submission.chain.trim().is_empty() {
            self.events.warn("A chain selection is required to start a job");
            return Err(anyhow!("Missing chain"));
        }

        let job_id = client.submit(submission).map_err(|e| anyhow!(e))?;
        let events = &mut self.events;
        let result_files = poller
            .poll_until_complete(client, &job_id, |tail| {
                events.push(AppEvent::LogUpdated(tail.to_string()))
            })
            .map_err(|e| anyhow!(e))?;

        let source = RemoteSource::new(client.clone(), &job_id);
        self.begin_session(
            SessionMode::Remote { job_id },
            Box::new(source),
            ResultFileSet::new(result_files),
        );
        self.initial_load();
        Ok(())
    }

    /// Open a previously exported archive in place of a remote job.
    pub fn open_archive(&mut self, path: &Path) -> Result<()> {
        let entries = archive::read_result_archive(path).map_err(|e| {
            self.events.error(e.clone());
            anyhow!(e)
        })?;
        let files: Vec<String> = entries
            .iter()
            .map(|e| e.name.clone())
            .filter(|n| n != SNAPSHOT_ENTRY && n != HEATMAP_ENTRY)
            .collect();
        let source = ArchiveSource::new(&entries);
        self.begin_session(
            SessionMode::Archive,
            Box::new(source),
            ResultFileSet::new(files),
        );
        self.initial_load();
        Ok(())
    }

    fn begin_session(
        &mut self,
        mode: SessionMode,
        source: Box<dyn crate::session::FileSource>,
        files: ResultFileSet,
    ) {
        self.session.begin(&mut self.engine, mode, source, files);
        self.selection = SelectionContext::Combined;
        self.current_structure = None;
    }

    /// Fetch and parse every energy table, then bulk-load all structures.
    fn initial_load(&mut self) {
        for filename in self
            .session
            .files()
            .table_files()
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
        {
            match self.session.fetch(&filename) {
                Ok(content) => {
                    let key = table_key_of(&filename);
                    self.session
                        .cache
                        .put(&key, energy_table::parse(&content, &key));
                }
                Err(e) => self.events.error(e),
            }
        }
        self.load_all();
    }

    /// Bulk-load every known structure file, keeping all of them visible.
    ///
    /// One fetch or parse failure is reported for its own file and never
    /// aborts the siblings. The camera fit and the finished signal wait for
    /// the whole countdown, failures included.
    pub fn load_all(&mut self) {
        self.loading = true;
        self.events.push(AppEvent::LoadingStarted);
        let files: Vec<String> = self
            .session
            .files()
            .structure_files()
            .into_iter()
            .cloned()
            .collect();
        let mut remaining = files.len();
        for filename in files {
            match self.load_structure_visible(&filename) {
                Ok(_) => {}
                Err(e) => self.events.error(e),
            }
            remaining -= 1;
            if remaining == 0 {
                self.engine.auto_fit();
            }
        }
        self.loading = false;
        self.events.push(AppEvent::LoadingFinished);
    }

    /// Fetch, load, normalize and style one structure.
    fn load_structure_visible(&mut self, filename: &str) -> Result<StructureHandle, String> {
        let content = self.session.fetch(filename)?;
        let handle = self.engine.load_structure(filename, &content)?;
        // Chain recovery must precede styling and residue enumeration.
        let _ = self.engine.recover_chain_ids(handle)?;
        self.engine
            .add_representation(handle, Representation::Cartoon, Selection::default())?;
        Ok(handle)
    }

    /// Click-driven single load: all prior structures go first, then exactly
    /// one comes in with the current display style.
    pub fn load_one(&mut self, filename: &str) -> Result<StructureHandle, String> {
        self.loading = true;
        self.events.push(AppEvent::LoadingStarted);
        for handle in self.engine.loaded_handles() {
            self.engine.remove_structure(handle);
        }
        self.current_structure = None;

        let result = self.load_structure_visible(filename);
        match &result {
            Ok(handle) => self.current_structure = Some(*handle),
            Err(e) => self.events.error(e.clone()),
        }
        self.loading = false;
        self.events.push(AppEvent::LoadingFinished);
        result
    }

    /// Select one mutation table and rebuild its heatmap matrix.
    pub fn select_table(&mut self, key: &str) -> EnergyMatrix {
        self.selection = SelectionContext::Table(key.to_string());
        self.events.push(AppEvent::HeatmapRefreshRequested {
            selection_label: key.to_string(),
        });
        self.events.push(AppEvent::ScrollRequested {
            table_key: key.to_string(),
        });
        // A missing key only means the table has not streamed in yet; an
        // empty matrix renders as an empty heatmap, not a failure.
        match self.session.cache.get(key) {
            Some(table) => EnergyMatrix::build(&[table]),
            None => EnergyMatrix::default(),
        }
    }

    /// Build the combined heatmap over every cached table, in cache order.
    pub fn select_combined(&mut self) -> EnergyMatrix {
        self.selection = SelectionContext::Combined;
        self.events.push(AppEvent::HeatmapRefreshRequested {
            selection_label: "combined".to_string(),
        });
        EnergyMatrix::build(&self.session.cache.tables())
    }

    /// Handle a heatmap cell click: resolve the structure file, load it,
    /// locate the mutated residue, highlight and zoom.
    pub fn click_cell(&mut self, residue_label: &str, mutant: char) -> Result<LocatedResidue> {
        let Ok(residue) = residue_label.parse::<u32>() else {
            let message =
                format!("Cannot map residue label '{residue_label}' to a structure position");
            self.events.warn(message.clone());
            return Err(anyhow!(message));
        };

        let filename = match structure_resolver::resolve(
            residue,
            mutant,
            &self.selection,
            self.session.files(),
        ) {
            Ok(filename) => filename,
            Err(miss) => {
                self.events.warn(miss.to_string());
                return Err(anyhow!(miss.to_string()));
            }
        };

        let handle = self.load_one(&filename).map_err(|e| anyhow!(e))?;

        let decoded = decode_structure_name(&filename);
        let filename_residue_hint = decoded.as_ref().map(|d| d.residue as i32);
        let mutant_name_hint = decoded
            .as_ref()
            .and_then(|d| AMINO_ACIDS.three_letter(d.mutant))
            .map(|s| s.to_string());

        let structure = self
            .engine
            .structure(handle)
            .ok_or_else(|| anyhow!("Structure '{filename}' vanished after loading"))?;
        let located = match residue_locator::locate(
            structure,
            filename_residue_hint,
            mutant_name_hint.as_deref(),
            residue as i32,
        ) {
            Ok(located) => located,
            Err(miss) => {
                self.events.warn(miss.to_string());
                return Err(anyhow!(miss.to_string()));
            }
        };

        let selection = Selection::residue_on_chain(&located.chain, located.number);
        self.engine
            .add_representation(handle, Representation::Highlight, selection.clone())
            .map_err(|e| anyhow!(e))?;
        self.engine
            .center_on(handle, selection.clone())
            .map_err(|e| anyhow!(e))?;
        self.events.push(AppEvent::ZoomRequested { selection });
        Ok(located)
    }

    /// Repackage the whole session into one downloadable archive: every
    /// result file, a viewer snapshot and the combined heatmap raster.
    pub fn export_results(&mut self, path: &Path) -> Result<()> {
        if !self.session.is_active() {
            self.events.warn("Nothing to export: no job or archive loaded");
            return Err(anyhow!("No session"));
        }

        let mut entries = Vec::new();
        for filename in self.session.files().files().to_vec() {
            match self.session.fetch(&filename) {
                Ok(content) => entries.push(ArchiveEntry::text(&filename, &content)),
                Err(e) => self.events.error(e),
            }
        }

        match self.engine.snapshot_png() {
            Ok(bytes) => entries.push(ArchiveEntry {
                name: SNAPSHOT_ENTRY.to_string(),
                bytes,
            }),
            Err(e) => self.events.error(e),
        }

        let combined = EnergyMatrix::build(&self.session.cache.tables());
        match HeatmapRenderer::png_bytes(&combined) {
            Ok(bytes) => entries.push(ArchiveEntry {
                name: HEATMAP_ENTRY.to_string(),
                bytes,
            }),
            Err(e) => self.events.error(e),
        }

        archive::write_result_archive(path, &entries).map_err(|e| {
            self.events.error(e.clone());
            anyhow!(e)
        })
    }
}
