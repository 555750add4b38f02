#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const UBL_INVOICE_KEYWORD: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2::Invoice##urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0::2.1";

pub const CII_INVOICE_KEYWORD: &str = "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100::CrossIndustryInvoice##urn:cen.eu:en16931:2017::D16B";

/// JSON body the validation service returns for one failed rule
pub const ONE_ERROR_RESPONSE: &str = r#"{"error_count":1,"warning_count":0,"errors":[{"message":"bad date","test":"R001","line":12}],"warnings":[]}"#;

pub const CLEAN_RESPONSE: &str =
    r#"{"error_count":0,"warning_count":0,"errors":[],"warnings":[]}"#;

/// Test fixture paths
pub struct TestFixtures {
    pub fixtures_dir: PathBuf,
}

impl TestFixtures {
    pub fn new() -> Self {
        let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures");

        Self { fixtures_dir }
    }

    pub fn ubl_invoice(&self) -> PathBuf {
        self.fixtures_dir.join("ubl_invoice.xml")
    }

    pub fn cii_invoice(&self) -> PathBuf {
        self.fixtures_dir.join("cii_invoice.xml")
    }

    pub fn sbdh_invoice(&self) -> PathBuf {
        self.fixtures_dir.join("sbdh_invoice.xml")
    }

    pub fn xxe(&self) -> PathBuf {
        self.fixtures_dir.join("xxe.xml")
    }

    pub fn malformed(&self) -> PathBuf {
        self.fixtures_dir.join("malformed.xml")
    }

    pub fn read(&self, path: &Path) -> Vec<u8> {
        std::fs::read(path).unwrap_or_else(|e| panic!("missing fixture {}: {}", path.display(), e))
    }
}

/// Write `content` to a file in a fresh temporary directory
pub fn write_temp_document(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    (temp_dir, path)
}

/// A localhost port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
