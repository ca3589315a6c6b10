use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
pub struct Config {
    pub port: u16,
    pub seed_file_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let mut seed_file_path = [".", "data", "seed.json"].iter().collect();

        if let Some(proj_dirs) = ProjectDirs::from("dev", "MovieCatalog", "Movie Catalog") {
            seed_file_path = PathBuf::from(proj_dirs.data_dir());
            seed_file_path.push("seed.json");
        }

        Self {
            port: 8080,
            seed_file_path,
        }
    }
}
