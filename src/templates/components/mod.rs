pub mod banner;
pub mod report_card;

pub use banner::{degraded_banner, error_banner};
pub use report_card::{priority_badge, report_card, status_form};
