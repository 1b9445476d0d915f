mod common;
mod expiry;
mod service;
