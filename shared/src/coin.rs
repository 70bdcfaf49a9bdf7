//! Coin catalog shared by the engine and the state codec
//!
//! A [`CoinCatalog`] is read-only configuration: the engine draws every round's
//! options from it, and a decoded state carries full [`Coin`] values so a
//! client can be rendered without a catalog lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single sliceable coin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub name: String,
    pub symbol: String,
    pub glyph: String,
    /// Points awarded (or deducted, when negative) for slicing this coin
    pub points: i64,
    /// Slicing a hazard costs a life and resets the combo
    pub is_hazard: bool,
}

impl Coin {
    pub fn new(name: &str, symbol: &str, glyph: &str, points: i64) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            glyph: glyph.to_string(),
            points,
            is_hazard: false,
        }
    }

    pub fn hazard(name: &str, symbol: &str, glyph: &str, points: i64) -> Self {
        Self {
            is_hazard: true,
            ..Self::new(name, symbol, glyph, points)
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog must contain exactly one hazard coin, found {0}")]
    HazardCount(usize),
    #[error("catalog needs at least {needed} regular coins, found {found}")]
    TooFewCoins { needed: usize, found: usize },
}

/// Ordered, immutable list of coins with exactly one hazard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinCatalog {
    coins: Vec<Coin>,
}

impl CoinCatalog {
    /// Builds a catalog, checking it can always fill a round of
    /// [`crate::OPTION_COUNT`] options
    pub fn new(coins: Vec<Coin>) -> Result<Self, CatalogError> {
        let hazards = coins.iter().filter(|coin| coin.is_hazard).count();
        if hazards != 1 {
            return Err(CatalogError::HazardCount(hazards));
        }

        let regular = coins.len() - hazards;
        if regular < crate::OPTION_COUNT {
            return Err(CatalogError::TooFewCoins {
                needed: crate::OPTION_COUNT,
                found: regular,
            });
        }

        Ok(Self { coins })
    }

    /// The production catalog: four tradeable coins and one scam
    pub fn standard() -> Self {
        Self {
            coins: vec![
                Coin::new("Bitcoin", "BTC", "₿", 100),
                Coin::new("Ethereum", "ETH", "Ξ", 80),
                Coin::new("Dogecoin", "DOGE", "Ð", 50),
                Coin::new("Solana", "SOL", "◎", 70),
                Coin::hazard("SCAM", "SCAM", "💣", -150),
            ],
        }
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn hazard(&self) -> &Coin {
        // `new` and `standard` both guarantee exactly one hazard
        self.coins
            .iter()
            .find(|coin| coin.is_hazard)
            .unwrap_or(&self.coins[0])
    }

    pub fn regular(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter().filter(|coin| !coin.is_hazard)
    }
}
