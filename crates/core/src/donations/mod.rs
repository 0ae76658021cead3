//! Donations module - recording donations against the campaign ledger.

mod donations_model;
mod donations_service;
mod donations_traits;


pub use donations_model::{
    Donation, DonationKind, DonationOrder, DonationQuery, DonationReceipt, DonationSubmission,
    NewDonation,
};
pub use donations_service::DonationService;
pub use donations_traits::{DonationRepositoryTrait, DonationServiceTrait};
