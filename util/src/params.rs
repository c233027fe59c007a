//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable ({}) is not set", crate::host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "$AFFORD_NAV_SW_ROOT/params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError> 
where
    P: DeserializeOwned
{
    // Get the params dir
    let mut path = crate::host::get_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    load_from_path(path)
}

/// Load a parameter file from an explicit path.
pub fn load_from_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>
{
    // Load the file into a string
    let params_str = match read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(e))
    };

    parse(params_str.as_str())
}

/// Parse parameters from a TOML string.
pub fn parse<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct TestParams {
        rate_hz: f64,
        #[serde(default)]
        name: Option<String>
    }

    #[test]
    fn test_parse() {
        let p: TestParams = parse("rate_hz = 15.0").unwrap();
        assert_eq!(p, TestParams { rate_hz: 15.0, name: None });

        let r: Result<TestParams, _> = parse("rate_hz = \"fast\"");
        assert!(matches!(r, Err(LoadError::DeserialiseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let r: Result<TestParams, _> = load_from_path("/definitely/not/a/params.toml");
        assert!(matches!(r, Err(LoadError::FileLoadError(_))));
    }
}
