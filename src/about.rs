pub const ENERVIEW_DISPLAY_VERSION: &str = env!("ENERVIEW_DISPLAY_VERSION");
pub const ENERVIEW_BUILD_N: &str = env!("ENERVIEW_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "EnerView {}\nBuild {}\nMutational-energy heatmap and structure viewer",
        ENERVIEW_DISPLAY_VERSION, ENERVIEW_BUILD_N
    )
}
