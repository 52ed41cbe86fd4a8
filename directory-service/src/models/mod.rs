pub mod location;
pub mod refresh_token;
pub mod store;
pub mod user;

pub use location::{Location, LocationChanges, NewLocation};
pub use refresh_token::RefreshTokenEntry;
pub use store::{NewStore, Store, StoreChanges, StoreRecord};
pub use user::{
    NewUser, NewUserRecord, Role, User, UserChanges, UserProfile, UserRecordChanges, UserSummary,
};
