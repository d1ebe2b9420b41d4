//! Request authentication: signature verification and token extraction.

pub mod extractor;
pub mod signature;

pub use extractor::extract;
pub use signature::{
    SIGNATURE_HEADERS, SignatureCandidate, compute_signature, format_signature_header,
    parse_signature_header, signature_candidates, verify_signature,
};
