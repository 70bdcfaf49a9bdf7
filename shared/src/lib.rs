use serde::{Deserialize, Serialize};

pub mod codec;
pub mod coin;
pub mod state;

pub use codec::{CodecError, StateCodec};
pub use coin::{CatalogError, Coin, CoinCatalog};
pub use state::{GameState, Screen};

pub const STATE_VERSION: u32 = 1;
pub const OPTION_COUNT: usize = 3;
pub const STARTING_LIVES: i64 = 3;
pub const ROUND_DURATION_SECS: u64 = 60;
pub const HAZARD_CHANCE: f64 = 0.3;
pub const MAX_DATAGRAM_SIZE: usize = 8192;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    /// First contact; answered with the landing frame and no state
    Landing,
    Press {
        button_index: u8,
        state: Option<String>,
    },

    Frame {
        frame: Frame,
        state: Option<String>,
    },
    Rejected {
        reason: String,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Post,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn post(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Post,
        }
    }
}

/// One renderable screen: an image, a title line and up to four buttons
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Frame {
    pub image: String,
    pub title: String,
    pub buttons: Vec<Button>,
}

impl Frame {
    pub fn new(image: impl Into<String>, title: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            image: image.into(),
            title: title.into(),
            buttons: labels.iter().map(|label| Button::post(*label)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new("https://img", "Title", &["One", "Two"]);
        assert_eq!(frame.image, "https://img");
        assert_eq!(frame.title, "Title");
        assert_eq!(frame.buttons.len(), 2);
        assert_eq!(frame.buttons[0], Button::post("One"));
        assert!(frame
            .buttons
            .iter()
            .all(|button| button.action == ButtonAction::Post));
    }

    #[test]
    fn test_packet_serialization_landing() {
        let serialized = bincode::serialize(&Packet::Landing).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();
        assert!(matches!(deserialized, Packet::Landing));
    }

    #[test]
    fn test_packet_serialization_press() {
        let packet = Packet::Press {
            button_index: 2,
            state: Some("{\"version\":1}".to_string()),
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Press {
                button_index,
                state,
            } => {
                assert_eq!(button_index, 2);
                assert_eq!(state.as_deref(), Some("{\"version\":1}"));
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_frame() {
        let packet = Packet::Frame {
            frame: Frame::new("img", "💣 Score: 10 | Lives: ❤️❤️", &["₿ Bitcoin (+100)"]),
            state: None,
        };

        let serialized = bincode::serialize(&packet).unwrap();
        assert!(serialized.len() < MAX_DATAGRAM_SIZE);
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Frame { frame, state } => {
                assert_eq!(frame.title, "💣 Score: 10 | Lives: ❤️❤️");
                assert_eq!(frame.buttons[0].label, "₿ Bitcoin (+100)");
                assert!(state.is_none());
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_defaults_are_consistent() {
        assert_eq!(OPTION_COUNT, 3);
        assert!(STARTING_LIVES > 0);
        assert!(HAZARD_CHANCE > 0.0 && HAZARD_CHANCE < 1.0);
        assert_eq!(ROUND_DURATION_SECS, 60);
    }
}
