pub mod random;
pub mod types;

pub use random::{RandomnessSource, SeedBuilder, Sha256Rng};
pub use types::{AssetInfo, AwardTier, CampaignKind};
