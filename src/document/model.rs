use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// A document for the document-creation endpoint, as read from input JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub description: Option<String>,
    pub participant_inn: String,
    pub doc_id: String,
    pub doc_status: String,
    pub doc_type: String,
    #[serde(default, rename = "importRequest")]
    pub import_request: Option<bool>,
    pub owner_inn: String,
    pub producer_inn: String,
    pub production_date: NaiveDate,
    pub production_type: String,
    pub reg_date: NaiveDate,
    pub reg_number: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub certificate_document: Option<String>,
    #[serde(default)]
    pub certificate_document_date: Option<NaiveDate>,
    #[serde(default)]
    pub certificate_document_number: Option<String>,
    // Fall back to the document's INNs when absent
    #[serde(default)]
    pub owner_inn: Option<String>,
    #[serde(default)]
    pub producer_inn: Option<String>,
    #[serde(default)]
    pub production_date: Option<NaiveDate>,
    pub tnved_code: String,
    #[serde(default)]
    pub uit_code: Option<String>,
    #[serde(default)]
    pub uitu_code: Option<String>,
}

/// The single certificate reference a product carries on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Certificate<'a> {
    Document(&'a str),
    DocumentDate(NaiveDate),
    DocumentNumber(&'a str),
}

/// Unit identifier of a product: either a unit-item code or a unit-item-unit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCode<'a> {
    Uit(&'a str),
    Uitu(&'a str),
}

impl Product {
    /// Picks the certificate field to send: document, else date, else number.
    pub fn certificate(&self) -> Option<Certificate<'_>> {
        if let Some(document) = &self.certificate_document {
            Some(Certificate::Document(document))
        } else if let Some(date) = self.certificate_document_date {
            Some(Certificate::DocumentDate(date))
        } else {
            self.certificate_document_number
                .as_deref()
                .map(Certificate::DocumentNumber)
        }
    }

    /// `index` and `doc_id` only locate the product in the error message.
    pub fn unit_code(&self, doc_id: &str, index: usize) -> Result<UnitCode<'_>> {
        match (&self.uit_code, &self.uitu_code) {
            (Some(uit), _) => Ok(UnitCode::Uit(uit)),
            (None, Some(uitu)) => Ok(UnitCode::Uitu(uitu)),
            (None, None) => Err(AppError::MissingUnitCode {
                doc_id: doc_id.to_string(),
                index,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn product(tnved_code: &str) -> Product {
        Product {
            certificate_document: None,
            certificate_document_date: None,
            certificate_document_number: None,
            owner_inn: None,
            producer_inn: None,
            production_date: None,
            tnved_code: tnved_code.to_string(),
            uit_code: None,
            uitu_code: None,
        }
    }

    pub fn document(products: Vec<Product>) -> Document {
        Document {
            description: None,
            participant_inn: "7700000001".to_string(),
            doc_id: "doc-42".to_string(),
            doc_status: "DRAFT".to_string(),
            doc_type: "LP_INTRODUCE_GOODS".to_string(),
            import_request: None,
            owner_inn: "7700000002".to_string(),
            producer_inn: "7700000003".to_string(),
            production_date: date("2024-03-01"),
            production_type: "OWN_PRODUCTION".to_string(),
            reg_date: date("2024-03-05"),
            reg_number: "R-0001".to_string(),
            products,
        }
    }
}
