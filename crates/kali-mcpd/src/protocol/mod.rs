//! Line-delimited JSON-RPC envelopes.
//!
//! Clients send one request object per line:
//!
//! ```json
//! {"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"nmap_scan","arguments":{"target":"10.0.0.5"}}}
//! ```
//!
//! The server answers every non-blank line with exactly one response line
//! carrying the same `id` (or `null` when the request had none).

mod errors;
mod request;
mod response;

pub use self::errors::{ErrorKind, ProtocolError, codes};
pub use self::request::Request;
pub use self::response::{ErrorObject, JSONRPC_VERSION, Response, ResponseBody, ResponseWriter};
