mod beneficiary;
mod boundary;
mod key;
mod land;
mod village;

pub use beneficiary::{aggregate_beneficiaries, BeneficiaryAggregate, BeneficiaryRecord};
pub use boundary::BoundaryPolygon;
pub use key::VillageKey;
pub use land::{ClassPolygon, LandType, VillageLandStats};
pub use village::{MatchedVillage, Unmatched, UnmatchedReason};
