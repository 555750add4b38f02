//! Document keyword derivation
//!
//! A keyword identifies the schema, customization profile and version of a
//! business document:
//!
//! ```text
//! {namespace}::{localName}##{doctype}::{version}
//! ```
//!
//! The validation service uses the same string to select a rule set, so the
//! derivation must stay byte-for-byte stable. For a Peppol BIS 3 UBL
//! invoice the keyword is
//!
//! ```text
//! urn:oasis:names:specification:ubl:schema:xsd:Invoice-2::Invoice##urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0::2.1
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::xml::{self, QualifiedName, XmlDocument};

pub const UBL_CBC_NAMESPACE: &str =
    "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
pub const CII_RSM_NAMESPACE: &str =
    "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100";
pub const CII_RAM_NAMESPACE: &str =
    "urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100";

/// Placeholder for a keyword component that could not be determined
pub const UNKNOWN: &str = "null";

/// A lookup path below the document element, tried in ascending priority.
#[derive(Debug, Clone, Copy)]
pub struct LookupPath {
    pub priority: u8,
    pub steps: &'static [QualifiedName<'static>],
}

/// Where the customization profile ("doctype") may be found
pub const DOCTYPE_PATHS: &[LookupPath] = &[
    LookupPath {
        priority: 0,
        steps: &[QualifiedName::new(UBL_CBC_NAMESPACE, "CustomizationID")],
    },
    LookupPath {
        priority: 1,
        steps: &[
            QualifiedName::new(CII_RSM_NAMESPACE, "ExchangedDocumentContext"),
            QualifiedName::new(
                CII_RAM_NAMESPACE,
                "GuidelineSpecifiedDocumentContextParameter",
            ),
            QualifiedName::new(CII_RAM_NAMESPACE, "ID"),
        ],
    },
];

/// Where an explicit version may be found; overrides the family default
pub const VERSION_PATHS: &[LookupPath] = &[LookupPath {
    priority: 0,
    steps: &[QualifiedName::new(UBL_CBC_NAMESPACE, "UBLVersionID")],
}];

/// Default versions by root namespace prefix, first match wins
pub const NAMESPACE_FAMILIES: &[(&str, &str)] = &[
    ("urn:oasis:names:specification:ubl:", "2.1"),
    (
        "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:",
        "D16B",
    ),
];

/// Canonical classification key of a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self(keyword.into())
    }

    pub fn from_parts(root: QualifiedName<'_>, doctype: &str, version: &str) -> Self {
        Self(format!(
            "{}::{}##{}::{}",
            root.namespace, root.local_name, doctype, version
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Keyword {
    fn from(keyword: String) -> Self {
        Self(keyword)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the keyword of a parsed document. Never fails.
pub fn derive(document: &XmlDocument<'_>) -> Keyword {
    let root = document.root_name();

    let doctype = first_text(document, DOCTYPE_PATHS).unwrap_or(UNKNOWN);
    let version = first_text(document, VERSION_PATHS)
        .unwrap_or_else(|| default_version(root.namespace));

    let keyword = Keyword::from_parts(root, doctype, version);
    debug!(%keyword, "derived keyword for document");
    keyword
}

/// Parse `bytes` with the safe parser and derive its keyword.
pub fn derive_from_bytes(bytes: &[u8]) -> Result<Keyword> {
    let document = xml::parse(bytes)?;
    Ok(derive(&document))
}

/// Default version for the namespace family of the document element
pub fn default_version(namespace: &str) -> &'static str {
    NAMESPACE_FAMILIES
        .iter()
        .find(|(prefix, _)| namespace.starts_with(prefix))
        .map(|(_, version)| *version)
        .unwrap_or(UNKNOWN)
}

/// Text of the first path, by priority, that resolves to an element with
/// non-empty text.
fn first_text<'a>(document: &'a XmlDocument<'_>, paths: &[LookupPath]) -> Option<&'a str> {
    let mut ordered: Vec<&LookupPath> = paths.iter().collect();
    ordered.sort_by_key(|path| path.priority);

    ordered.into_iter().find_map(|path| {
        document
            .find(path.steps)
            .and_then(|element| element.text())
            .filter(|text| !text.is_empty())
    })
}
