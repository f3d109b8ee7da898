//! JSON schema structs for recipe documents.
//!
//! One document per recipe:
//!
//! ```json
//! {
//!   "result": { "type": "mc:potion", "amount": 1 },
//!   "ingredients": [
//!     { "type": "cauldron:item", "item": "mc:nether_wart", "amount": 2 },
//!     { "type": "cauldron:item", "item": "mc:spider_eye", "amount": 1 }
//!   ],
//!   "experience": 5,
//!   "name": "Vile Brew",
//!   "description": "Smells exactly how it looks.",
//!   "comment": "balance-reviewed 2026-06"
//! }
//! ```
//!
//! Ingredient entries are raw JSON objects handed to the core's variant
//! codec table, so host-registered variant types deserialize without schema
//! changes here.

use serde::Deserialize;
use serde_json::Value;

/// Top-level recipe document.
#[derive(Debug, Deserialize)]
pub struct RecipeDoc {
    pub result: ResultDoc,
    #[serde(default)]
    pub ingredients: Vec<Value>,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// The craft result descriptor.
#[derive(Debug, Deserialize)]
pub struct ResultDoc {
    #[serde(rename = "type")]
    pub item: String,
    #[serde(default = "one")]
    pub amount: u32,
}

fn one() -> u32 {
    1
}
