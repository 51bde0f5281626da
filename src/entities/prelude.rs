pub use super::admins::Entity as Admins;
pub use super::banners::Entity as Banners;
pub use super::bids::Entity as Bids;
pub use super::lots::Entity as Lots;
pub use super::users::Entity as Users;
