pub mod extractor;
pub mod key;

pub use extractor::extract_identifier;
pub use key::{
    generate_dedup_key, KeyDiagnostics, KeyGenerator, KeyType, LinkDigester, Sha256Digester,
};
