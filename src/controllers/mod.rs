pub mod article;
pub mod back_to_top;
pub mod navbar;
pub mod search;
pub mod subscribe;

pub use article::{CopyLink, Favorite};
pub use back_to_top::BackToTop;
pub use navbar::{MenuClick, MobileMenu, Navbar};
pub use search::{search_url, OrderBy, SearchBox};
pub use subscribe::{validate_email, SubmitOutcome, SubscribeForm};
