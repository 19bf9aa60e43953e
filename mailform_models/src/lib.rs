pub mod contact;
pub mod credentials;
pub mod dispatch;
pub mod email_address;
