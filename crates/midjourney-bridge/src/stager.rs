//! Filesystem staging of downloaded generation results

#[path = "stager_tests.rs"]
mod stager_tests;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::StagingError;
use crate::tiler;

const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "output";

/// Stages raw downloaded bytes into finished artifacts.
///
/// Two sibling directories live under the injected staging root: `input/`
/// holds the raw download transiently and is empty again between requests;
/// `output/` accumulates one finished artifact per completed request.
#[derive(Debug, Clone)]
pub struct ArtifactStager {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl ArtifactStager {
    pub fn new(staging_root: impl AsRef<Path>) -> Self {
        let root = staging_root.as_ref();
        Self {
            input_dir: root.join(INPUT_DIR),
            output_dir: root.join(OUTPUT_DIR),
        }
    }

    /// Stage one downloaded artifact under `key`, returning the output path.
    ///
    /// Fresh grid results are split into quadrants and only the top-left
    /// tile is kept as the canonical artifact; the other three variations
    /// are discarded. Upscaled results are already a single final image and
    /// move to the output area unchanged. Either way the input-area copy is
    /// gone when this returns.
    pub fn stage(
        &self,
        bytes: &[u8],
        key: &str,
        is_upscale: bool,
    ) -> std::result::Result<PathBuf, StagingError> {
        fs::create_dir_all(&self.input_dir)?;
        fs::create_dir_all(&self.output_dir)?;

        let input_path = self.input_dir.join(key);
        let output_path = self.output_dir.join(key);
        fs::write(&input_path, bytes)?;

        if is_upscale {
            fs::rename(&input_path, &output_path)?;
        } else {
            let result = Self::tile_to_output(&input_path, &output_path);
            // The input copy goes away even when tiling failed.
            fs::remove_file(&input_path)?;
            result?;
        }

        debug!("artifact staged: {}", output_path.display());
        Ok(output_path)
    }

    fn tile_to_output(
        input_path: &Path,
        output_path: &Path,
    ) -> std::result::Result<(), StagingError> {
        let image = image::open(input_path)?;
        let tiles = tiler::split(&image);
        // JPEG has no alpha channel; grid results may arrive as RGBA PNGs.
        tiles.top_left.to_rgb8().save(output_path)?;
        Ok(())
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
