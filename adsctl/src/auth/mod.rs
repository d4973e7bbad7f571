//! Caller identification.
//!
//! Authentication happens in front of this service. The upstream proxy injects the caller's user
//! ID into a header (`auth.user_header`, default `x-user-id`), which handlers read through the
//! [`current_user::CurrentUser`] extractor:
//!
//! ```ignore
//! use adsctl::auth::current_user::CurrentUser;
//!
//! async fn handler(user: CurrentUser) -> String {
//!     format!("Hello, {}!", user.id)
//! }
//! ```
//!
//! A missing header is rejected with 401, a header that is not a UUID with 400.

pub mod current_user;
