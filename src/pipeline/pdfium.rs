//! Locating and binding the pdfium shared library.
//!
//! Lookup order:
//! 1. `PDFIUM_LIB_PATH`, either the library file itself or its directory
//! 2. The current working directory
//! 3. The system library search path

use crate::error::BrandKitError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable naming an explicit pdfium library or directory.
pub const PDFIUM_LIB_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to the first pdfium library that loads.
pub fn bind_pdfium() -> Result<Pdfium, BrandKitError> {
    let mut failures = Vec::new();

    for candidate in candidates() {
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => failures.push(format!("{}: {}", candidate.display(), e)),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound system pdfium");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            failures.push(format!("system library: {}", e));
            Err(BrandKitError::PdfiumBindingFailed(failures.join("; ")))
        }
    }
}

/// True when [`bind_pdfium`] would succeed.
pub fn pdfium_available() -> bool {
    bind_pdfium().is_ok()
}

fn candidates() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(explicit) = std::env::var_os(PDFIUM_LIB_ENV) {
        let explicit = PathBuf::from(explicit);
        if explicit.is_dir() {
            paths.push(Pdfium::pdfium_platform_library_name_at_path(&explicit));
        } else {
            paths.push(explicit);
        }
    }
    paths.push(Pdfium::pdfium_platform_library_name_at_path("./"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_directory_is_always_a_candidate() {
        let paths = candidates();
        let local = Pdfium::pdfium_platform_library_name_at_path("./");
        assert_eq!(paths.last(), Some(&local));
    }

    #[test]
    fn binding_failure_is_a_typed_error() {
        // Either outcome is valid depending on the machine; failure must
        // carry the attempted locations.
        if let Err(err) = bind_pdfium() {
            assert!(matches!(err, BrandKitError::PdfiumBindingFailed(_)));
            assert!(err.to_string().contains("system library"));
        }
    }
}
