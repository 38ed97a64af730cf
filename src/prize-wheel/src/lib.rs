//! # prize-wheel
//!
//! Weighted prize draw and wheel presentation for spin-to-win funnels.
//!
//! This library provides:
//! - A validated prize catalog with per-category selection weights
//! - Weighted random selection plus six-digit redemption codes
//! - Wheel layout and rotation targets that land on the drawn prize
//! - A client-side play flow that allows one spin per session
//!
//! Randomness is always passed in, so every draw can be reproduced with a
//! seeded generator.
//!
//! ## Example
//!
//! ```
//! use prize_wheel::{Catalog, PrizeSelector, WheelLayout};
//!
//! let catalog = Catalog::default();
//! let layout = WheelLayout::new(&catalog);
//! let selector = PrizeSelector::new(catalog);
//!
//! let mut rng = rand::thread_rng();
//! let result = selector.draw(&mut rng);
//! let rotation = layout.rotation_for(result.index, &mut rng);
//!
//! println!("{} ({}) -> {} deg", result.category.label, result.code, rotation.degrees);
//! ```

pub mod catalog;
pub mod play;
pub mod selector;
pub mod wheel;

#[doc(inline)]
pub use catalog::{
    Catalog, CatalogError, CatalogFile, PrizeCategory, PrizeDef, PrizeEntry, DEFAULT_PRIZES,
};
#[doc(inline)]
pub use play::{MemorySessionStore, PlayError, PlaySession, PlayState, SessionStore, Ticket};
#[doc(inline)]
pub use selector::{CodeError, DrawResult, PrizeSelector, RedemptionCode, CODE_MAX, CODE_MIN};
#[doc(inline)]
pub use wheel::{
    target_rotation, Rotation, WheelLayout, WheelSegment, MIN_REVOLUTIONS, SPIN_DURATION,
};
