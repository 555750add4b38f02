//! Standard Business Document Header (SBDH) unwrapping
//!
//! An SBDH envelope carries a header element followed by the business
//! document it transports. Unwrapping hands back only that payload; any
//! other document passes through untouched.

use std::borrow::Cow;

use tracing::{debug, info};

use crate::error::{DocValError, Result};
use crate::xml::{self, QualifiedName};

pub const SBDH_NAMESPACE: &str =
    "http://www.unece.org/cefact/namespaces/StandardBusinessDocumentHeader";

/// Root element of an envelope
pub const ENVELOPE_ROOT: QualifiedName<'static> =
    QualifiedName::new(SBDH_NAMESPACE, "StandardBusinessDocument");

/// Header element inside an envelope, never the payload
pub const ENVELOPE_HEADER: QualifiedName<'static> =
    QualifiedName::new(SBDH_NAMESPACE, "StandardBusinessDocumentHeader");

/// Return the business document inside an SBDH envelope.
///
/// Input whose root is not an envelope is returned as-is, borrowed. For an
/// envelope, the first child that is not the header is serialized and
/// returned; an envelope without such a child fails with
/// [`DocValError::EmptyEnvelope`]. Envelope correctness beyond that is not
/// checked.
pub fn unwrap(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    let document = xml::parse(bytes)?;
    let root = document.root();

    if root.name() != ENVELOPE_ROOT {
        debug!(root = %root.name(), "document is not an SBDH envelope, passing through");
        return Ok(Cow::Borrowed(bytes));
    }

    let payload = root
        .child_elements()
        .find(|child| child.name() != ENVELOPE_HEADER)
        .ok_or(DocValError::EmptyEnvelope)?;

    info!(payload = %payload.name(), "unwrapped document from SBDH envelope");
    Ok(Cow::Owned(payload.to_xml()))
}
