use amino_acids::AminoAcids;
use lazy_static::lazy_static;

pub mod about;
pub mod amino_acids;
pub mod app;
pub mod archive;
pub mod energy_matrix;
pub mod energy_table;
pub mod events;
pub mod heatmap;
pub mod job_api;
pub mod mutation_cache;
pub mod polling;
pub mod residue_locator;
pub mod result_files;
pub mod session;
pub mod structure;
pub mod structure_resolver;
pub mod viewer;

lazy_static! {
    // Amino acid three-letter/one-letter code table
    pub static ref AMINO_ACIDS: AminoAcids = AminoAcids::load();
}
