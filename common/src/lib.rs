//! Dalat Market Common Library
//!
//! CLIとゲートウェイで共有される型・プロンプト・パーサー（I/Oなし）

pub mod types;
pub mod error;
pub mod strings;
pub mod prompts;
pub mod parser;

pub use types::{GroundingSource, ItemIdentification, Language, MapSpot, PriceResult, TranslationResult};
pub use error::{Error, Result};
pub use strings::{messages, Messages};
pub use prompts::{build_identify_prompt, build_map_spots_prompt, build_price_prompt, build_translate_prompt};
pub use parser::{
    extract_json, grounding_source, map_spot, parse_item_name, parse_price_response,
    parse_translation_response, strip_emphasis, try_parse_translation, ParseOutcome,
};
