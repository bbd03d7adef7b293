//! Action-to-input mappings and their JSON form.
//!
//! A mapping file is a JSON object keyed by action name:
//!
//! ```json
//! {
//!   "PaddleUp": [{ "key": 265 }, { "axis": { "axis": 1, "dir": -1 } }, { "button": 1 }],
//!   "Launch": [{ "key": 32 }]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{GamepadAxis, GamepadButton, KeyCode};
use crate::error::MappingError;

/// One raw input that can trigger an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnyInput {
    Key(KeyCode),
    /// An analog axis pushed in direction `dir` (`-1` or `1`).
    Axis { axis: GamepadAxis, dir: i32 },
    Button(GamepadButton),
}

/// Every action with the inputs that trigger it.
pub type InputMapping<A> = BTreeMap<A, Vec<AnyInput>>;

/// Parse a mapping from its JSON text.
pub fn parse_mapping<A>(json: &str) -> Result<InputMapping<A>, MappingError>
where
    A: Ord + DeserializeOwned,
{
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a mapping file.
pub fn load_mapping<A>(path: impl AsRef<Path>) -> Result<InputMapping<A>, MappingError>
where
    A: Ord + DeserializeOwned,
{
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mapping = parse_mapping(&json)?;
    tracing::info!(path = %path.display(), actions = mapping.len(), "loaded input mapping");
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{axis, button, key};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
    enum Act {
        Up,
        Fire,
    }

    #[test]
    fn test_parse_mapping() {
        let mapping: InputMapping<Act> = parse_mapping(
            r#"{
                "Up": [{"key": 265}, {"axis": {"axis": 1, "dir": -1}}, {"button": 1}],
                "Fire": [{"key": 32}]
            }"#,
        )
        .unwrap();

        assert_eq!(
            mapping[&Act::Up],
            vec![
                AnyInput::Key(key::UP),
                AnyInput::Axis {
                    axis: axis::LEFT_Y,
                    dir: -1
                },
                AnyInput::Button(button::LEFT_FACE_UP),
            ]
        );
        assert_eq!(mapping[&Act::Fire], vec![AnyInput::Key(key::SPACE)]);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = parse_mapping::<Act>(r#"{"Jump": [{"key": 32}]}"#).unwrap_err();
        assert!(matches!(err, MappingError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_mapping::<Act>("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, MappingError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn test_load_mapping_from_file() {
        let path = std::env::temp_dir().join(format!("input-mapping-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"Fire": [{"button": 7}]}"#).unwrap();
        let mapping: InputMapping<Act> = load_mapping(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(mapping[&Act::Fire], vec![AnyInput::Button(button::RIGHT_FACE_DOWN)]);
    }
}
