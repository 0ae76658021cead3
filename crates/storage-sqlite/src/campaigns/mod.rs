//! SQLite storage implementation for campaigns and their raised totals.

mod model;
mod repository;

pub use model::{CampaignChangesetDB, CampaignDB};
pub(crate) use model::cents;
pub(crate) use repository::{increment_raised, load_titles};
pub use repository::CampaignRepository;
