//! Page objects for the invoice parser UI
//!
//! Each type owns the selectors of one screen and exposes semantic actions.
//! Actions that navigate return the destination page object, verified
//! against its route before it is handed back.

pub mod base;
pub mod dashboard;
pub mod invoice;
pub mod invoices;
pub mod login;
pub mod navigation;
pub mod upload;

pub use base::{BasePage, PageObject};
pub use dashboard::DashboardPage;
pub use invoice::InvoicePage;
pub use invoices::InvoicesPage;
pub use login::LoginPage;
pub use navigation::NavigationComponent;
pub use upload::{UploadOutcome, UploadPage, UploadSignal};
