pub mod http;
pub mod isapi;
pub mod xml;
