pub use super::connection_requests::Entity as ConnectionRequests;
pub use super::connections::Entity as Connections;
pub use super::notifications::Entity as Notifications;
pub use super::users::Entity as Users;
