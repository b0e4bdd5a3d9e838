// Client-facing plumbing: credential discovery, the certificate-exempt
// loopback transport, and event frame decoding.

pub mod events;
pub mod locator;
pub mod transport;

pub use locator::{ClientLocator, Credentials};
pub use transport::{EventStream, LcuTransport};
