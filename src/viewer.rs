use crate::structure::Structure;
use image::{ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Cursor;

/// Opaque reference to one loaded structure inside a render engine.
pub type StructureHandle = usize;

/// Visual styles the orchestration layer asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Representation {
    /// Whole-structure default style, colored by chain.
    Cartoon,
    /// Residue-scoped highlight added after a successful locate.
    Highlight,
}

/// Scope of a representation or camera action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub chain: Option<String>,
    pub residue: Option<i32>,
}

impl Selection {
    pub fn residue_on_chain(chain: &str, residue: i32) -> Self {
        Self {
            chain: Some(chain.to_string()),
            residue: Some(residue),
        }
    }
}

/// Last camera instruction an engine received.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CameraState {
    #[default]
    Home,
    AutoFit,
    CenteredOn(StructureHandle, Selection),
}

/// Capability interface of the 3D rendering engine.
///
/// The real engine is an external collaborator; the viewer core only ever
/// talks through this trait: load raw structure text, manage representations,
/// move the camera, take a raster snapshot, and enumerate/patch structure
/// metadata.
pub trait RenderEngine {
    fn load_structure(&mut self, name: &str, pdb_text: &str) -> Result<StructureHandle, String>;
    fn remove_structure(&mut self, handle: StructureHandle);
    /// Remove every loaded structure and representation.
    fn clear(&mut self);
    fn structure(&self, handle: StructureHandle) -> Option<&Structure>;
    fn loaded_handles(&self) -> Vec<StructureHandle>;
    /// Copy segment identifiers into empty chain identifiers, in place.
    fn recover_chain_ids(&mut self, handle: StructureHandle) -> Result<usize, String>;
    fn add_representation(
        &mut self,
        handle: StructureHandle,
        style: Representation,
        selection: Selection,
    ) -> Result<(), String>;
    fn center_on(&mut self, handle: StructureHandle, selection: Selection) -> Result<(), String>;
    /// Fit the camera around everything currently loaded.
    fn auto_fit(&mut self);
    /// Raster snapshot of the current scene as PNG bytes.
    fn snapshot_png(&self) -> Result<Vec<u8>, String>;
}

const SNAPSHOT_SIZE: u32 = 600;

const CHAIN_PALETTE: &[[u8; 3]] = &[
    [102, 194, 165],
    [252, 141, 98],
    [141, 160, 203],
    [231, 138, 195],
    [166, 216, 84],
    [255, 217, 47],
];

/// Software implementation of [`RenderEngine`].
///
/// Backs the CLI and the tests: structures are held as parsed atom lists,
/// representations and camera moves are recorded, and the snapshot is a flat
/// orthographic dot plot of the loaded atoms, colored by chain.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    structures: HashMap<StructureHandle, Structure>,
    order: Vec<StructureHandle>,
    representations: Vec<(StructureHandle, Representation, Selection)>,
    camera: CameraState,
    next_handle: StructureHandle,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn representations(&self) -> &[(StructureHandle, Representation, Selection)] {
        &self.representations
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    fn xy_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for handle in &self.order {
            let Some(structure) = self.structures.get(handle) else {
                continue;
            };
            for atom in &structure.atoms {
                let (x, y) = (atom.pos[0], atom.pos[1]);
                bounds = Some(match bounds {
                    None => (x, x, y, y),
                    Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
                });
            }
        }
        bounds
    }
}

impl RenderEngine for HeadlessEngine {
    fn load_structure(&mut self, name: &str, pdb_text: &str) -> Result<StructureHandle, String> {
        let structure = Structure::from_pdb_text(name, pdb_text)?;
        let handle = self.next_handle;
        self.next_handle += 1;
        let _ = self.structures.insert(handle, structure);
        self.order.push(handle);
        Ok(handle)
    }

    fn remove_structure(&mut self, handle: StructureHandle) {
        let _ = self.structures.remove(&handle);
        self.order.retain(|h| *h != handle);
        self.representations.retain(|(h, _, _)| *h != handle);
    }

    fn clear(&mut self) {
        self.structures.clear();
        self.order.clear();
        self.representations.clear();
        self.camera = CameraState::Home;
    }

    fn structure(&self, handle: StructureHandle) -> Option<&Structure> {
        self.structures.get(&handle)
    }

    fn loaded_handles(&self) -> Vec<StructureHandle> {
        self.order.clone()
    }

    fn recover_chain_ids(&mut self, handle: StructureHandle) -> Result<usize, String> {
        self.structures
            .get_mut(&handle)
            .map(|s| s.normalize_chain_ids())
            .ok_or_else(|| format!("No structure loaded under handle {handle}"))
    }

    fn add_representation(
        &mut self,
        handle: StructureHandle,
        style: Representation,
        selection: Selection,
    ) -> Result<(), String> {
        if !self.structures.contains_key(&handle) {
            return Err(format!("No structure loaded under handle {handle}"));
        }
        self.representations.push((handle, style, selection));
        Ok(())
    }

    fn center_on(&mut self, handle: StructureHandle, selection: Selection) -> Result<(), String> {
        if !self.structures.contains_key(&handle) {
            return Err(format!("No structure loaded under handle {handle}"));
        }
        self.camera = CameraState::CenteredOn(handle, selection);
        Ok(())
    }

    fn auto_fit(&mut self) {
        self.camera = CameraState::AutoFit;
    }

    fn snapshot_png(&self) -> Result<Vec<u8>, String> {
        let mut img = RgbaImage::from_pixel(SNAPSHOT_SIZE, SNAPSHOT_SIZE, Rgba([24, 24, 28, 255]));

        if let Some((x0, x1, y0, y1)) = self.xy_bounds() {
            let span = (x1 - x0).max(y1 - y0).max(1e-6);
            let margin = 20.0;
            let scale = (f64::from(SNAPSHOT_SIZE) - 2.0 * margin) / span;
            for handle in &self.order {
                let Some(structure) = self.structures.get(handle) else {
                    continue;
                };
                let chains = structure.chains();
                for atom in &structure.atoms {
                    let chain_index = chains
                        .iter()
                        .position(|c| *c == atom.chain_id)
                        .unwrap_or(0);
                    let [r, g, b] = CHAIN_PALETTE[chain_index % CHAIN_PALETTE.len()];
                    let px = margin + (atom.pos[0] - x0) * scale;
                    let py = margin + (atom.pos[1] - y0) * scale;
                    for dx in -1..=1i64 {
                        for dy in -1..=1i64 {
                            let x = px as i64 + dx;
                            let y = py as i64 + dy;
                            if x >= 0
                                && y >= 0
                                && (x as u32) < SNAPSHOT_SIZE
                                && (y as u32) < SNAPSHOT_SIZE
                            {
                                img.put_pixel(x as u32, y as u32, Rgba([r, g, b, 255]));
                            }
                        }
                    }
                }
            }
        }

        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| format!("Could not encode viewer snapshot: {e}"))?;
        Ok(bytes.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::test_pdb::atom_line;

    fn pdb() -> String {
        [
            atom_line(1, "N", "GLU", "A", 60, ""),
            atom_line(2, "CA", "GLU", "A", 60, ""),
            atom_line(3, "CA", "ALA", " ", 61, "PROC"),
        ]
        .join("\n")
    }

    #[test]
    fn load_enumerate_and_remove() {
        let mut engine = HeadlessEngine::new();
        let handle = engine.load_structure("one", &pdb()).unwrap();
        assert_eq!(engine.loaded_handles(), vec![handle]);
        assert_eq!(engine.structure(handle).unwrap().atoms.len(), 3);
        engine.remove_structure(handle);
        assert!(engine.loaded_handles().is_empty());
        assert!(engine.structure(handle).is_none());
    }

    #[test]
    fn recover_chain_ids_patches_in_place() {
        let mut engine = HeadlessEngine::new();
        let handle = engine.load_structure("one", &pdb()).unwrap();
        assert_eq!(engine.recover_chain_ids(handle).unwrap(), 1);
        let chains = engine.structure(handle).unwrap().chains();
        assert!(chains.contains(&"PROC".to_string()));
    }

    #[test]
    fn representations_and_camera_are_recorded() {
        let mut engine = HeadlessEngine::new();
        let handle = engine.load_structure("one", &pdb()).unwrap();
        engine
            .add_representation(handle, Representation::Highlight, Selection::residue_on_chain("A", 60))
            .unwrap();
        engine
            .center_on(handle, Selection::residue_on_chain("A", 60))
            .unwrap();
        assert_eq!(engine.representations().len(), 1);
        assert!(matches!(engine.camera(), CameraState::CenteredOn(h, _) if *h == handle));
    }

    #[test]
    fn unknown_handles_are_errors() {
        let mut engine = HeadlessEngine::new();
        assert!(engine.recover_chain_ids(7).is_err());
        assert!(engine
            .add_representation(7, Representation::Cartoon, Selection::default())
            .is_err());
        assert!(engine.center_on(7, Selection::default()).is_err());
    }

    #[test]
    fn snapshot_encodes_png_even_when_empty() {
        let engine = HeadlessEngine::new();
        let bytes = engine.snapshot_png().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
