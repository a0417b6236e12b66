//! Resource identifiers embedded in user-supplied links.
//!
//! Extraction never fails loudly: a link without a recognizable id yields
//! `None` and the caller decides which validation message applies.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOCUMENT_ID: Regex = Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("valid regex");
    static ref FOLDER_ID: Regex = Regex::new(r"/folders/([a-zA-Z0-9_-]+)").expect("valid regex");
    // Any run of at least 25 id characters, wherever it sits in the link.
    static ref FILE_ID: Regex = Regex::new(r"[a-zA-Z0-9_-]{25,}").expect("valid regex");
}

/// Id of a document from a link such as `https://docs.example.com/document/d/<id>/edit`.
pub fn extract_document_id(url: &str) -> Option<&str> {
    DOCUMENT_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Id of a folder from a link such as `https://drive.example.com/drive/folders/<id>`.
pub fn extract_folder_id(url: &str) -> Option<&str> {
    FOLDER_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Id of an arbitrary file, found by length alone.
pub fn extract_file_id(url: &str) -> Option<&str> {
    FILE_ID.find(url).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1AbC_dEf-GhIjKlMnOpQrStUvWxYz";

    #[test]
    fn document_id_from_edit_link() {
        let url = format!("https://docs.google.com/document/d/{ID}/edit?usp=sharing");
        assert_eq!(extract_document_id(&url), Some(ID));
    }

    #[test]
    fn folder_id_from_drive_link() {
        let url = format!("https://drive.google.com/drive/u/0/folders/{ID}");
        assert_eq!(extract_folder_id(&url), Some(ID));
        assert_eq!(extract_document_id(&url), None);
    }

    #[test]
    fn file_id_needs_a_long_token() {
        let url = format!("https://drive.google.com/open?id={ID}");
        assert_eq!(extract_file_id(&url), Some(ID));
        assert_eq!(extract_file_id("https://example.com/short-id"), None);
    }

    #[test]
    fn malformed_input_is_not_found() {
        assert_eq!(extract_document_id(""), None);
        assert_eq!(extract_folder_id("not a link"), None);
    }
}
