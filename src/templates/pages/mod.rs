pub mod citizen;
pub mod detail;
pub mod login;
pub mod map;
pub mod worker;

pub use citizen::{citizen_page, CitizenVm};
pub use detail::detail_page;
pub use login::login_page;
pub use map::map_page;
pub use worker::{worker_page, WorkerVm};
