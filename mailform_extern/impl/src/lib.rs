pub mod http;
pub mod sendgrid;
