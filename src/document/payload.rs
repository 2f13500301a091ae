//! Wire form of a document for the document-creation endpoint.
//!
//! Building a payload validates the document; nothing here touches the network,
//! so invalid input is rejected before any request quota is taken.

use chrono::NaiveDate;
use serde::Serialize;

use crate::document::model::{Certificate, Document, Product, UnitCode};
use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct DocumentPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description<'a>>,
    pub doc_id: &'a str,
    pub doc_status: &'a str,
    pub doc_type: &'a str,
    #[serde(rename = "importRequest", skip_serializing_if = "Option::is_none")]
    pub import_request: Option<bool>,
    pub owner_inn: &'a str,
    pub participant_inn: &'a str,
    pub producer_inn: &'a str,
    pub production_date: NaiveDate,
    pub production_type: &'a str,
    // A document without products is sent with no `products` key rather than `[]`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ProductPayload<'a>>,
    pub reg_date: NaiveDate,
    pub reg_number: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Description<'a> {
    pub participant_inn: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ProductPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_document: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_document_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_document_number: Option<&'a str>,
    pub owner_inn: &'a str,
    pub producer_inn: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_date: Option<NaiveDate>,
    pub tnved_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uit_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uitu_code: Option<&'a str>,
}

impl<'a> DocumentPayload<'a> {
    /// Fails on the first product without a unit code.
    pub fn build(document: &'a Document) -> Result<Self> {
        let products = document
            .products
            .iter()
            .enumerate()
            .map(|(index, product)| ProductPayload::build(document, product, index))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            description: document.description.as_ref().map(|_| Description {
                participant_inn: &document.participant_inn,
            }),
            doc_id: &document.doc_id,
            doc_status: &document.doc_status,
            doc_type: &document.doc_type,
            import_request: document.import_request,
            owner_inn: &document.owner_inn,
            participant_inn: &document.participant_inn,
            producer_inn: &document.producer_inn,
            production_date: document.production_date,
            production_type: &document.production_type,
            products,
            reg_date: document.reg_date,
            reg_number: &document.reg_number,
        })
    }
}

impl<'a> ProductPayload<'a> {
    fn build(document: &'a Document, product: &'a Product, index: usize) -> Result<Self> {
        let unit = product.unit_code(&document.doc_id, index)?;

        let mut payload = Self {
            certificate_document: None,
            certificate_document_date: None,
            certificate_document_number: None,
            owner_inn: product.owner_inn.as_deref().unwrap_or(&document.owner_inn),
            producer_inn: product.producer_inn.as_deref().unwrap_or(&document.producer_inn),
            // Same date as the document is implied and not repeated
            production_date: product
                .production_date
                .filter(|date| *date != document.production_date),
            tnved_code: &product.tnved_code,
            uit_code: None,
            uitu_code: None,
        };

        match product.certificate() {
            Some(Certificate::Document(doc)) => payload.certificate_document = Some(doc),
            Some(Certificate::DocumentDate(date)) => payload.certificate_document_date = Some(date),
            Some(Certificate::DocumentNumber(num)) => payload.certificate_document_number = Some(num),
            None => {}
        }

        match unit {
            UnitCode::Uit(code) => payload.uit_code = Some(code),
            UnitCode::Uitu(code) => payload.uitu_code = Some(code),
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::fixtures::{date, document, product};
    use crate::error::AppError;
    use serde_json::{json, Value};

    fn to_json(document: &Document) -> Value {
        serde_json::to_value(DocumentPayload::build(document).unwrap()).unwrap()
    }

    #[test]
    fn test_document_fields() {
        let mut doc = document(vec![]);
        let json = to_json(&doc);

        assert_eq!(json["doc_id"], "doc-42");
        assert_eq!(json["production_date"], "2024-03-01");
        assert_eq!(json["producer_inn"], "7700000003");
        assert_eq!(json["reg_date"], "2024-03-05");
        assert!(json.get("description").is_none());
        assert!(json.get("importRequest").is_none());
        assert!(json.get("products").is_none());

        doc.description = Some("first batch".into());
        doc.import_request = Some(false);
        let json = to_json(&doc);
        assert_eq!(json["description"], json!({ "participantInn": "7700000001" }));
        assert_eq!(json["importRequest"], false);
    }

    #[test]
    fn test_products_with_either_unit_code() {
        let mut a = product("6401");
        a.uit_code = Some("UIT-A".into());
        let mut b = product("6402");
        b.uitu_code = Some("UITU-B".into());

        let json = to_json(&document(vec![a, b]));
        let products = json["products"].as_array().unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0]["uit_code"], "UIT-A");
        assert!(products[0].get("uitu_code").is_none());
        assert_eq!(products[1]["uitu_code"], "UITU-B");
        assert!(products[1].get("uit_code").is_none());
        assert_eq!(products[1]["tnved_code"], "6402");
    }

    #[test]
    fn test_missing_unit_code_is_rejected() {
        let mut ok = product("6401");
        ok.uit_code = Some("UIT-A".into());
        let broken = product("6402");

        let doc = document(vec![ok, broken]);
        match DocumentPayload::build(&doc) {
            Err(AppError::MissingUnitCode { doc_id, index }) => {
                assert_eq!(doc_id, "doc-42");
                assert_eq!(index, 1);
            }
            other => panic!("expected MissingUnitCode, got {:?}", other),
        }
    }

    #[test]
    fn test_production_date_only_when_different() {
        let mut same = product("6401");
        same.uit_code = Some("U1".into());
        same.production_date = Some(date("2024-03-01"));

        let mut other = product("6401");
        other.uit_code = Some("U2".into());
        other.production_date = Some(date("2024-02-15"));

        let json = to_json(&document(vec![same, other]));
        let products = json["products"].as_array().unwrap();

        assert!(products[0].get("production_date").is_none());
        assert_eq!(products[1]["production_date"], "2024-02-15");
    }

    #[test]
    fn test_single_certificate_field() {
        let mut p = product("6401");
        p.uit_code = Some("U1".into());
        p.certificate_document_date = Some(date("2023-10-10"));
        p.certificate_document_number = Some("N-1".into());

        let json = to_json(&document(vec![p]));
        let emitted = &json["products"][0];

        assert_eq!(emitted["certificate_document_date"], "2023-10-10");
        assert!(emitted.get("certificate_document").is_none());
        assert!(emitted.get("certificate_document_number").is_none());
    }

    #[test]
    fn test_product_inn_falls_back_to_document() {
        let mut own = product("6401");
        own.uit_code = Some("U1".into());
        own.owner_inn = Some("5500000001".into());

        let mut inherited = product("6401");
        inherited.uit_code = Some("U2".into());

        let json = to_json(&document(vec![own, inherited]));
        assert_eq!(json["products"][0]["owner_inn"], "5500000001");
        assert_eq!(json["products"][0]["producer_inn"], "7700000003");
        assert_eq!(json["products"][1]["owner_inn"], "7700000002");
    }
}
