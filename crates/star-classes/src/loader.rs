//! Labeled stars file loader
//!
//! One star per line: `<id> <class>`, separated by whitespace or a comma.
//! Blank lines and lines starting with `#` are ignored.

use crate::registry::StarClasses;
use crate::RegistryError;
use light_curve::StarId;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

impl StarClasses {
    /// Build a registry from a labeled stars listing
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, RegistryError> {
        let mut stars = StarClasses::new();

        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, class) = parse_line(line).map_err(|reason| RegistryError::Parse {
                line: n + 1,
                reason,
            })?;

            stars.add_star(id, class).map_err(|e| RegistryError::Parse {
                line: n + 1,
                reason: e.to_string(),
            })?;
        }

        Ok(stars)
    }

    /// Load a labeled stars file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| RegistryError::Io(format!("{}: {}", path.display(), e)))?;
        let stars = Self::from_reader(BufReader::new(file))?;

        info!("Loaded {} stars from {}", stars.number_of_stars(), path.display());
        Ok(stars)
    }
}

fn parse_line(line: &str) -> Result<(StarId, &str), String> {
    let tokens: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    match tokens.as_slice() {
        [id, class] => {
            let id = id
                .parse::<u64>()
                .map_err(|e| format!("invalid star id '{}': {}", id, e))?;
            Ok((StarId(id), class))
        }
        _ => Err(format!("expected '<id> <class>', got {} fields", tokens.len())),
    }
}
