pub mod google;

pub use google::{GoogleOidcClient, GoogleProfile};
