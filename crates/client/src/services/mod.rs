//! Application services: the flows the screens call, composed from the
//! gateway, the models, and the core validators.

pub mod avatar;
pub mod catalog;
pub mod publishing;
pub mod registration;

pub use avatar::upload_avatar;
pub use publishing::{FileUpload, NewBookForm, PublishError, publish_book};
pub use registration::{AvatarImage, RegistrationError, RegistrationForm, register};
