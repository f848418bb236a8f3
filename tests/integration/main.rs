//! Integration tests: end-to-end claim scenarios against a scripted
//! platform, and the Textbroker client against a local HTTP server.

mod mock_platform;
mod textbroker_http;
