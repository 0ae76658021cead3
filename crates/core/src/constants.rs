/// Fractional digits kept for monetary amounts
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Largest monetary amount accepted for goals and donations (10 digits, 2 decimals)
pub const MAX_MONEY_AMOUNT: &str = "99999999.99";

/// Campaigns per page on the search listing
pub const CAMPAIGN_PAGE_SIZE: usize = 9;

/// Campaigns shown on the home page
pub const HOME_CAMPAIGN_LIMIT: usize = 6;

/// Donations embedded in a campaign detail
pub const RECENT_DONATIONS_LIMIT: usize = 5;

/// Maximum campaign title length
pub const CAMPAIGN_TITLE_MAX_LEN: usize = 200;

/// Maximum length of an in-kind donation description
pub const ITEM_DESCRIPTION_MAX_LEN: usize = 255;

/// Maximum username length
pub const USERNAME_MAX_LEN: usize = 150;

/// Maximum category name length
pub const CATEGORY_NAME_MAX_LEN: usize = 100;
