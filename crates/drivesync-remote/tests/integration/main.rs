//! Gateway integration tests against a wiremock server.

mod common;
mod test_about;
mod test_listing;
mod test_lookup;
mod test_upload;
