//! Opaque state blob encoding
//!
//! The blob is JSON so that it survives any text transport untouched. A blob
//! that fails to parse, carries another schema version, or describes an
//! impossible state is never an error for the caller of [`StateCodec::decode`]:
//! the supplied fresh state is used instead.

use crate::state::GameState;
use crate::STATE_VERSION;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("state blob is not valid JSON for this schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("state blob has schema version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("state blob is structurally invalid: {0}")]
    Invalid(&'static str),
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

pub struct StateCodec;

impl StateCodec {
    pub fn encode(state: &GameState) -> Result<String, CodecError> {
        Ok(serde_json::to_string(state)?)
    }

    /// Strict decode, used by [`StateCodec::decode`] and by tests that care
    /// about the rejection reason
    pub fn try_decode(raw: &str) -> Result<GameState, CodecError> {
        let probe: VersionProbe = serde_json::from_str(raw)?;
        if probe.version != STATE_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: probe.version,
                expected: STATE_VERSION,
            });
        }

        let state: GameState = serde_json::from_str(raw)?;
        state.validate().map_err(CodecError::Invalid)?;
        Ok(state)
    }

    /// Total decode: missing or rejected blobs become `fresh()`
    pub fn decode<F>(raw: Option<&str>, fresh: F) -> GameState
    where
        F: FnOnce() -> GameState,
    {
        let Some(raw) = raw else {
            debug!("No state supplied, starting fresh");
            return fresh();
        };

        match Self::try_decode(raw) {
            Ok(state) => state,
            Err(e) => {
                warn!("Discarding client state: {}", e);
                fresh()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::CoinCatalog;
    use crate::state::Screen;

    fn sample_state() -> GameState {
        let catalog = CoinCatalog::standard();
        let options = vec![
            catalog.coins()[1].clone(),
            catalog.hazard().clone(),
            catalog.coins()[3].clone(),
        ];
        let mut state = GameState::new(options, 2, 1_700_000_000_000);
        state.score = 420;
        state.combo = 4;
        state.screen = Screen::Game;
        state
    }

    fn fresh() -> GameState {
        GameState::new(CoinCatalog::standard().coins()[..3].to_vec(), 3, 7)
    }

    #[test]
    fn test_round_trip() {
        let state = sample_state();
        let blob = StateCodec::encode(&state).unwrap();
        assert_eq!(StateCodec::try_decode(&blob).unwrap(), state);
        assert_eq!(StateCodec::decode(Some(&blob), fresh), state);
    }

    #[test]
    fn test_round_trip_every_screen() {
        for screen in [
            Screen::Menu,
            Screen::Game,
            Screen::Rules,
            Screen::Leaderboard,
            Screen::Shop,
            Screen::GameOver,
        ] {
            let mut state = sample_state();
            state.screen = screen;
            let blob = StateCodec::encode(&state).unwrap();
            assert_eq!(StateCodec::decode(Some(&blob), fresh), state);
        }
    }

    #[test]
    fn test_missing_state_uses_fresh() {
        assert_eq!(StateCodec::decode(None, fresh), fresh());
    }

    #[test]
    fn test_garbage_uses_fresh() {
        for raw in ["", "not json", "{}", "[1,2,3]", "{\"version\":1}", "null"] {
            assert_eq!(StateCodec::decode(Some(raw), fresh), fresh(), "{raw:?}");
        }
    }

    #[test]
    fn test_old_version_rejected() {
        let mut state = sample_state();
        state.version = STATE_VERSION + 1;
        let blob = StateCodec::encode(&state).unwrap();

        match StateCodec::try_decode(&blob) {
            Err(CodecError::UnsupportedVersion { found, expected }) => {
                assert_eq!(found, STATE_VERSION + 1);
                assert_eq!(expected, STATE_VERSION);
            }
            other => panic!("Expected version rejection, got {:?}", other),
        }
        assert_eq!(StateCodec::decode(Some(&blob), fresh), fresh());
    }

    #[test]
    fn test_forged_shape_rejected() {
        let mut state = sample_state();
        state.options.truncate(1);
        let blob = StateCodec::encode(&state).unwrap();

        assert!(matches!(
            StateCodec::try_decode(&blob),
            Err(CodecError::Invalid(_))
        ));
        assert_eq!(StateCodec::decode(Some(&blob), fresh), fresh());
    }

    #[test]
    fn test_blob_uses_camel_case_fields() {
        let blob = StateCodec::encode(&sample_state()).unwrap();
        assert!(blob.contains("\"startTime\":1700000000000"));
        assert!(blob.contains("\"gameOver\":false"));
        assert!(blob.contains("\"isHazard\":true"));
        assert!(blob.contains("\"screen\":\"game\""));
    }
}
